//! Host configuration store.
//!
//! Values keep the type they were written with; typed getters convert the way
//! the host does, parsing numbers from strings with "C" numeric conventions
//! and yielding zero/`None` for anything that does not parse.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::engine::WindowHandle;

/// A stored configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Double(f64),
    /// Opaque native handle (window mode `output_dst`)
    Handle(WindowHandle),
}

impl Value {
    fn as_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Double(d) => Some(d.to_string()),
            Value::Handle(_) => None,
        }
    }

    fn as_double(&self) -> f64 {
        match self {
            Value::String(s) => parse_double(s),
            Value::Int(i) => *i as f64,
            Value::Double(d) => *d,
            Value::Handle(_) => 0.0,
        }
    }

    fn as_int(&self) -> i64 {
        match self {
            Value::String(s) => parse_int(s),
            Value::Int(i) => *i,
            Value::Double(d) => *d as i64,
            Value::Handle(_) => 0,
        }
    }
}

/// Parse the longest leading integer, like `atoi`. "0x" prefixes are hex.
fn parse_int(s: &str) -> i64 {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).unwrap_or(0);
    }
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().unwrap_or(0)
}

/// Parse a double with '.' as the decimal point. A "num/den" rational is
/// accepted since frame rates are often written that way.
fn parse_double(s: &str) -> f64 {
    let s = s.trim();
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.trim().parse().unwrap_or(0.0);
        let den: f64 = den.trim().parse().unwrap_or(0.0);
        return if den == 0.0 { 0.0 } else { num / den };
    }
    s.parse().unwrap_or(0.0)
}

/// Thread-safe key/value configuration of a consumer
#[derive(Debug, Default)]
pub struct Properties {
    values: RwLock<HashMap<String, Value>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.set_value(key, Value::String(value.into()));
    }

    pub fn set_int(&self, key: &str, value: i64) {
        self.set_value(key, Value::Int(value));
    }

    pub fn set_double(&self, key: &str, value: f64) {
        self.set_value(key, Value::Double(value));
    }

    pub fn set_handle(&self, key: &str, handle: WindowHandle) {
        self.set_value(key, Value::Handle(handle));
    }

    pub fn set_value(&self, key: &str, value: Value) {
        self.values.write().insert(key.to_string(), value);
    }

    /// String form of a value; handles have none
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).and_then(Value::as_string)
    }

    pub fn get_int(&self, key: &str) -> i64 {
        self.values.read().get(key).map(Value::as_int).unwrap_or(0)
    }

    pub fn get_double(&self, key: &str) -> f64 {
        self.values.read().get(key).map(Value::as_double).unwrap_or(0.0)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_int(key) != 0
    }

    pub fn get_handle(&self, key: &str) -> Option<WindowHandle> {
        match self.values.read().get(key) {
            Some(Value::Handle(handle)) => Some(*handle),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_roundtrip() {
        let props = Properties::new();
        props.set("output_mux", "ps");
        props.set_int("output_vb", 8_000_000);
        props.set_double("fps", 25.0);
        props.set_handle("output_dst", WindowHandle(0x1234));

        assert_eq!(props.get("output_mux").as_deref(), Some("ps"));
        assert_eq!(props.get_int("output_vb"), 8_000_000);
        assert_eq!(props.get_double("fps"), 25.0);
        assert_eq!(props.get_handle("output_dst"), Some(WindowHandle(0x1234)));
        assert_eq!(props.get("output_dst"), None);
    }

    #[test]
    fn test_numeric_strings() {
        let props = Properties::new();
        props.set("width", "720");
        props.set("fps", "30000/1001");
        props.set("display_ratio", "1.77778");
        props.set("frequency", "48000Hz");
        props.set("flag", "0x10");

        assert_eq!(props.get_int("width"), 720);
        assert!((props.get_double("fps") - 29.97).abs() < 0.001);
        assert!((props.get_double("display_ratio") - 1.77778).abs() < 1e-9);
        assert_eq!(props.get_int("frequency"), 48_000);
        assert_eq!(props.get_int("flag"), 16);
    }

    #[test]
    fn test_missing_and_garbage() {
        let props = Properties::new();
        props.set("junk", "abc");
        assert_eq!(props.get_int("missing"), 0);
        assert_eq!(props.get_double("missing"), 0.0);
        assert_eq!(props.get("missing"), None);
        assert_eq!(props.get_int("junk"), 0);
        assert!(!props.get_bool("junk"));
        assert_eq!(props.get_handle("junk"), None);
    }

    #[test]
    fn test_number_to_string() {
        let props = Properties::new();
        props.set_double("fps", 25.0);
        props.set_int("channels", 2);
        assert_eq!(props.get("fps").as_deref(), Some("25"));
        assert_eq!(props.get("channels").as_deref(), Some("2"));
    }
}

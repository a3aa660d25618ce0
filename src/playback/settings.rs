//! Consumer configuration: defaults, output mode and the per-run snapshot.

use crate::core::format::{self, AudioFormat, ImageFormat, Negotiated};
use crate::engine::mrl::{AudioInput, MediaLocation, Transcode, VideoInput};
use crate::engine::WindowHandle;
use crate::host::Properties;

/// Service id selecting window output
pub const WINDOW_SERVICE_ID: &str = "libvlc_window";

/// Recognized configuration keys
pub mod keys {
    pub const INPUT_IMAGE_FORMAT: &str = "input_image_format";
    pub const INPUT_AUDIO_FORMAT: &str = "input_audio_format";
    pub const OUTPUT_VCODEC: &str = "output_vcodec";
    pub const OUTPUT_ACODEC: &str = "output_acodec";
    pub const OUTPUT_VB: &str = "output_vb";
    pub const OUTPUT_AB: &str = "output_ab";
    pub const OUTPUT_MUX: &str = "output_mux";
    pub const OUTPUT_ACCESS: &str = "output_access";
    pub const OUTPUT_DST: &str = "output_dst";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const DISPLAY_RATIO: &str = "display_ratio";
    pub const FPS: &str = "fps";
    pub const FREQUENCY: &str = "frequency";
    pub const CHANNELS: &str = "channels";
    pub const WINDOW_TYPE: &str = "window_type";
    pub const TERMINATE_ON_PAUSE: &str = "terminate_on_pause";
}

/// Where the engine sends what it plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Render into a native window
    Window,
    /// Encode into a file or stream
    Transcode,
}

impl OutputMode {
    pub fn from_service_id(id: &str) -> Self {
        if id == WINDOW_SERVICE_ID {
            OutputMode::Window
        } else {
            OutputMode::Transcode
        }
    }
}

/// Constructor argument naming the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Path or stream address for transcode mode
    Location(String),
    /// Native handle for window mode
    Window(WindowHandle),
}

/// Write the consumer's defaults into `props`
pub fn apply_defaults(props: &Properties, destination: Option<OutputDestination>) {
    props.set_int(keys::INPUT_IMAGE_FORMAT, ImageFormat::Yuv422.raw() as i64);
    props.set_int(keys::INPUT_AUDIO_FORMAT, AudioFormat::S16.raw() as i64);
    props.set(keys::OUTPUT_VCODEC, "mp2v");
    props.set(keys::OUTPUT_ACODEC, "mpga");
    props.set_int(keys::OUTPUT_VB, 8_000_000);
    props.set_int(keys::OUTPUT_AB, 128_000);
    match destination {
        Some(OutputDestination::Location(location)) => props.set(keys::OUTPUT_DST, location),
        Some(OutputDestination::Window(handle)) => props.set_handle(keys::OUTPUT_DST, handle),
        None => {}
    }
    props.set(keys::OUTPUT_MUX, "ps");
    props.set(keys::OUTPUT_ACCESS, "file");
}

/// Configuration frozen at `start` for the whole run.
///
/// Callbacks only ever read this copy, so a caller changing the properties
/// mid-run cannot hand the engine buffers that disagree with the formats it
/// was set up for.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingProperties {
    pub width: u32,
    pub height: u32,
    pub display_ratio: String,
    pub fps: f64,
    pub video: Negotiated<ImageFormat>,
    pub audio: Negotiated<AudioFormat>,
    pub frequency: u32,
    pub channels: u32,
    pub window_type: Option<String>,
    pub window_handle: Option<WindowHandle>,
    pub output_dst: Option<String>,
    pub video_bitrate: i64,
    pub audio_bitrate: i64,
    pub vcodec: String,
    pub acodec: String,
    pub access: String,
    pub mux: String,
    pub terminate_on_pause: bool,
}

fn non_negative(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

impl WorkingProperties {
    pub fn snapshot(props: &Properties) -> Self {
        Self {
            width: non_negative(props.get_int(keys::WIDTH)),
            height: non_negative(props.get_int(keys::HEIGHT)),
            display_ratio: props.get(keys::DISPLAY_RATIO).unwrap_or_default(),
            fps: props.get_double(keys::FPS),
            video: format::negotiate_video(props.get_int(keys::INPUT_IMAGE_FORMAT) as i32),
            audio: format::negotiate_audio(props.get_int(keys::INPUT_AUDIO_FORMAT) as i32),
            frequency: non_negative(props.get_int(keys::FREQUENCY)),
            channels: non_negative(props.get_int(keys::CHANNELS)),
            window_type: props.get(keys::WINDOW_TYPE),
            window_handle: props.get_handle(keys::OUTPUT_DST),
            output_dst: props.get(keys::OUTPUT_DST),
            video_bitrate: props.get_int(keys::OUTPUT_VB),
            audio_bitrate: props.get_int(keys::OUTPUT_AB),
            vcodec: props.get(keys::OUTPUT_VCODEC).unwrap_or_default(),
            acodec: props.get(keys::OUTPUT_ACODEC).unwrap_or_default(),
            access: props.get(keys::OUTPUT_ACCESS).unwrap_or_default(),
            mux: props.get(keys::OUTPUT_MUX).unwrap_or_default(),
            terminate_on_pause: props.get_bool(keys::TERMINATE_ON_PAUSE),
        }
    }

    pub fn video_input(&self) -> VideoInput {
        VideoInput {
            width: self.width,
            height: self.height,
            display_ratio: self.display_ratio.clone(),
            fps: self.fps,
            codec: self.video.codec,
        }
    }

    pub fn audio_input(&self) -> AudioInput {
        AudioInput {
            codec: self.audio.codec,
            frequency: self.frequency,
            channels: self.channels,
        }
    }

    pub fn transcode(&self) -> Transcode {
        Transcode {
            vcodec: self.vcodec.clone(),
            acodec: self.acodec.clone(),
            fps: self.fps,
            width: self.width,
            height: self.height,
            video_bitrate: self.video_bitrate,
            audio_bitrate: self.audio_bitrate,
            channels: self.channels,
            frequency: self.frequency,
            access: self.access.clone(),
            mux: self.mux.clone(),
            dst: self.output_dst.clone().unwrap_or_default(),
        }
    }

    /// Location and options for this run's media
    pub fn media_location(&self, mode: OutputMode) -> MediaLocation {
        let media = MediaLocation::imem(&self.video_input(), &self.audio_input());
        match mode {
            OutputMode::Window => media,
            OutputMode::Transcode => media.with_transcode(&self.transcode()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::FourCC;

    fn profile(props: &Properties) {
        props.set_int(keys::WIDTH, 1920);
        props.set_int(keys::HEIGHT, 1080);
        props.set(keys::DISPLAY_RATIO, "1.77778");
        props.set_double(keys::FPS, 25.0);
        props.set_int(keys::FREQUENCY, 48_000);
        props.set_int(keys::CHANNELS, 2);
    }

    #[test]
    fn test_mode_from_service_id() {
        assert_eq!(OutputMode::from_service_id("libvlc_window"), OutputMode::Window);
        assert_eq!(OutputMode::from_service_id("libvlc"), OutputMode::Transcode);
        assert_eq!(OutputMode::from_service_id(""), OutputMode::Transcode);
    }

    #[test]
    fn test_defaults() {
        let props = Properties::new();
        apply_defaults(&props, Some(OutputDestination::Location("out.mpg".into())));
        let working = WorkingProperties::snapshot(&props);
        assert_eq!(working.video.codec, FourCC::YUY2);
        assert_eq!(working.audio.codec, FourCC::S16L);
        assert_eq!(working.vcodec, "mp2v");
        assert_eq!(working.acodec, "mpga");
        assert_eq!(working.video_bitrate, 8_000_000);
        assert_eq!(working.audio_bitrate, 128_000);
        assert_eq!(working.mux, "ps");
        assert_eq!(working.access, "file");
        assert_eq!(working.output_dst.as_deref(), Some("out.mpg"));
        assert_eq!(working.window_handle, None);
        assert!(!working.terminate_on_pause);
    }

    #[test]
    fn test_window_destination_is_a_handle() {
        let props = Properties::new();
        apply_defaults(&props, Some(OutputDestination::Window(WindowHandle(77))));
        let working = WorkingProperties::snapshot(&props);
        assert_eq!(working.window_handle, Some(WindowHandle(77)));
        assert_eq!(working.output_dst, None);
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let props = Properties::new();
        apply_defaults(&props, None);
        profile(&props);
        let working = WorkingProperties::snapshot(&props);
        props.set_int(keys::WIDTH, 640);
        props.set_int(keys::INPUT_IMAGE_FORMAT, ImageFormat::Rgba.raw() as i64);
        assert_eq!(working.width, 1920);
        assert_eq!(working.video.format, ImageFormat::Yuv422);
    }

    #[test]
    fn test_media_location_per_mode() {
        let props = Properties::new();
        apply_defaults(&props, Some(OutputDestination::Location("out.mpg".into())));
        profile(&props);
        props.set_int(keys::INPUT_AUDIO_FORMAT, AudioFormat::F32le.raw() as i64);
        let working = WorkingProperties::snapshot(&props);

        let window = working.media_location(OutputMode::Window);
        assert_eq!(
            window.location,
            "imem://width=1920:height=1080:dar=1.77778:fps=25/1:cookie=0:codec=YUY2:cat=2:caching=0"
        );
        assert_eq!(window.options.len(), 1);
        assert!(window.options[0].contains("codec=fl32:samplerate=48000:channels=2"));

        let transcode = working.media_location(OutputMode::Transcode);
        assert_eq!(transcode.options.len(), 2);
        assert!(transcode.options[1].starts_with(":sout=#transcode{vcodec=mp2v,fps=25,width=1920"));
        assert!(transcode.options[1].ends_with("dst=\"out.mpg\"}"));
    }
}

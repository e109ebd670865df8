//! External media tooling: `ffprobe` inspection and `ffmpeg` short-form cropping.

/// `ffprobe` stream and format inspection.
pub mod probe;
/// Vertical short crops of finished videos.
pub mod shorts;

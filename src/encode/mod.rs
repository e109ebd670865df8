//! Encoding sinks.
//!
//! Sinks consume rendered card-layer frames in timeline order.

/// `ffmpeg`-based compositing sink and output helpers.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;

//! CPU rendering of the animated card layer.

/// Frame iteration, chunked parallel rendering and sink streaming.
pub mod frames;
/// Single-frame card layer raster.
pub mod layer;

//! Deterministic flip-then-zoom reveal animation.

pub(crate) mod timeline;

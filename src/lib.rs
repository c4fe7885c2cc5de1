//! ascii-camera library crate.
//!
//! Renders a live webcam feed as a terminal glyph mosaic. The internals
//! are exposed as a library so the integration tests can drive the
//! session against scripted camera and display doubles.

pub mod ascii;
pub mod camera;
pub mod session;
pub mod terminal;

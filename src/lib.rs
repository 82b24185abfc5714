//! redtri - a red triangle in a window
//!
//! The binary initializes the [`toolkit`], lets [`scene::setup`] request the
//! window and display callback, and runs the event loop. The same setup runs
//! against a headless render target in tests.

pub mod config;
pub mod scene;
pub mod toolkit;

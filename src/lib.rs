//! Frame synchronization and feature smoothing for audio-reactive sketches.
//!
//! A precomputed analysis file is loaded once ([`analysis`]), resolved to
//! the current playback time every tick ([`sync::resolve`]), and smoothed
//! into stable per-feature signals ([`sync::Smoother`],
//! [`sync::SmootherBank`]). [`session::SketchSession`] bundles that state
//! for one sketch and is ticked by an external scheduler.

pub mod analysis;
pub mod math;
pub mod session;
pub mod sync;
pub mod trace;
pub mod uniforms;

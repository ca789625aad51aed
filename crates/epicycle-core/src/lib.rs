//! # epicycle-core
//!
//! Fourier epicycle reconstruction of closed 2D drawings.
//!
//! A drawable's outline is sampled by arc length ([`sampler`]), decomposed
//! into rotating arrows one frequency at a time ([`fourier`]), and animated by
//! the [`store::EpicycleStore`], which composes backend-free frames
//! ([`compositor`]) for a renderer to draw.

pub mod animation;
pub mod compositor;
pub mod config;
pub mod drawable;
pub mod driver;
pub mod error;
pub mod fourier;
pub mod sampler;
pub mod store;
pub mod transitions;
pub mod viewport;

pub use compositor::{DrawCommand, Frame, Marker, SceneCompositor};
pub use config::EpicycleConfig;
pub use drawable::{Drawable, DrawableLibrary, DrawableLoader, FsDrawableLoader};
pub use error::{AssetParseError, EpicycleError, Result};
pub use fourier::{coefficient, frequency_for_index, reconstruct, reconstruction_error, Arrow};
pub use sampler::PathSampler;
pub use store::{EpicycleState, EpicycleStore, LoadState};
pub use viewport::Viewport;

//! Particle logo: a window full of particles that sample the pixels of a
//! logo, ease back to where they were sampled and scatter away from the
//! mouse.
//!
//! - [`logo`]: fetch/decode the logo on a worker thread
//! - [`mask`]: draw the logo centered and keep its alpha
//! - [`field`]: seed, update and draw particles
//! - [`app`]: the frame loop tying window, input and field together

pub mod app;
pub mod config;
pub mod draw;
pub mod error;
pub mod field;
pub mod input;
pub mod logo;
pub mod mask;
pub mod types;

pub use app::{Animation, StopHandle};
pub use config::{Config, FieldParams};
pub use error::{Error, Result};
pub use field::{Particle, ParticleField, SeedReport};
pub use logo::{LoadState, Logo, LogoLoader, LogoSource};

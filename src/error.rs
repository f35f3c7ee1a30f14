// One error type for the whole program.
// Every variant states *where* things went wrong.
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),
    /// Pushing the framebuffer to the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    /// Reading or downloading the logo bytes failed
    #[error("Logo fetch error: {0}")]
    LogoFetch(String),
    /// The logo bytes are not a usable image
    #[error("Logo decode error: {0}")]
    LogoDecode(String),
    /// The logo worker went away without reporting back
    #[error("Logo loader disconnected")]
    LoaderGone,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

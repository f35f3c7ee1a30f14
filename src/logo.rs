// Loads the logo image the particles are sampled from.
// The load runs on a worker thread; the frame loop polls it once per frame and
// keeps presenting black frames until it resolves.

use std::io::Read;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use image::RgbaImage;

use crate::error::{Error, Result};

/// Largest logo download we accept.
const MAX_LOGO_BYTES: u64 = 16 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Where the logo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Url(String),
    File(PathBuf),
}

impl LogoSource {
    /// `http://` and `https://` are fetched, anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            LogoSource::Url(raw.to_string())
        } else {
            LogoSource::File(PathBuf::from(raw))
        }
    }

    fn fetch_bytes(&self) -> Result<Vec<u8>> {
        match self {
            LogoSource::Url(url) => {
                let agent = ureq::Agent::config_builder()
                    .timeout_global(Some(REQUEST_TIMEOUT))
                    .build()
                    .new_agent();
                let response = agent
                    .get(url)
                    .call()
                    .map_err(|e| Error::LogoFetch(format!("GET {url}: {e}")))?;
                read_capped(response.into_body().into_reader(), MAX_LOGO_BYTES)
                    .map_err(|e| Error::LogoFetch(format!("read body of {url}: {e}")))
            }
            LogoSource::File(path) => std::fs::read(path)
                .map_err(|e| Error::LogoFetch(format!("read {}: {e}", path.display()))),
        }
    }
}

/// Read everything, failing instead of truncating when `limit` is exceeded.
fn read_capped<R: Read>(reader: R, limit: u64) -> std::result::Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| e.to_string())?;
    if bytes.len() as u64 > limit {
        return Err(format!("logo exceeds {} MiB", limit / (1024 * 1024)));
    }
    Ok(bytes)
}

impl std::fmt::Display for LogoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoSource::Url(url) => f.write_str(url),
            LogoSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A decoded logo with non-zero natural size.
#[derive(Clone)]
pub struct Logo {
    image: RgbaImage,
}

impl Logo {
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::LogoDecode("logo has zero width or height".into()));
        }
        Ok(Self { image })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| Error::LogoDecode(e.to_string()))?;
        Self::from_image(decoded.to_rgba8())
    }

    /// Fetch and decode in one go (blocking).
    pub fn load(source: &LogoSource) -> Result<Self> {
        let bytes = source.fetch_bytes()?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 { self.image.width() }
    pub fn height(&self) -> u32 { self.image.height() }
    pub fn image(&self) -> &RgbaImage { &self.image }
}

/// Lifecycle of the logo load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed,
}

/// Handle to a logo load running on a worker thread.
pub struct LogoLoader {
    rx: Receiver<Result<Logo>>,
    state: LoadState,
}

impl LogoLoader {
    pub fn spawn(source: LogoSource) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::Builder::new()
            .name("logo-loader".into())
            .spawn(move || {
                tracing::info!(%source, "loading logo");
                let result = Logo::load(&source);
                // The frame loop may already be gone; nothing to report to then.
                let _ = tx.send(result);
            })
            .map_or_else(
                |e| Self::resolved(Err(Error::LogoFetch(format!("spawn loader: {e}")))),
                |_| Self { rx, state: LoadState::Loading },
            )
    }

    /// A loader that has already finished, e.g. for a logo decoded up front.
    pub fn resolved(result: Result<Logo>) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(result);
        Self { rx, state: LoadState::Loading }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Non-blocking. Yields the outcome exactly once, when the worker reports.
    pub fn poll(&mut self) -> Option<Result<Logo>> {
        if self.state != LoadState::Loading {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(Error::LoaderGone),
        };
        Some(self.settle(outcome))
    }

    /// Like [`poll`](Self::poll) but blocks for up to `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<Logo>> {
        if self.state != LoadState::Loading {
            return None;
        }
        let outcome = match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(Error::LoaderGone),
        };
        Some(self.settle(outcome))
    }

    fn settle(&mut self, outcome: Result<Logo>) -> Result<Logo> {
        match &outcome {
            Ok(logo) => {
                self.state = LoadState::Ready;
                tracing::info!(width = logo.width(), height = logo.height(), "logo ready");
            }
            Err(e) => {
                self.state = LoadState::Failed;
                tracing::error!(error = %e, "logo load failed");
            }
        }
        outcome
    }
}

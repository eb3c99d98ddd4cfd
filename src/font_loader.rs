use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::{error::FontLoadError, font_handle::FontHandle};

/// Raw response of a font request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP-like status code. File reads report `200`.
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Creates a `200` response carrying `body`.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves the bytes behind a font locator.
///
/// Implementations may block; [`FontLoader`] calls them off the owner thread.
pub trait FontFetcher: Send + Sync {
    fn fetch(&self, locator: &str) -> Result<FetchResponse, FontLoadError>;
}

/// Reads fonts from the filesystem.
///
/// Web-style absolute locators (`/fonts/a.ttf`) are resolved against `root`
/// when one is set.
#[derive(Clone, Debug, Default)]
pub struct FileFetcher {
    pub root: Option<PathBuf>,
}

impl FileFetcher {
    /// Creates a fetcher that resolves locators as plain paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher that resolves absolute locators under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Filesystem path a locator maps to.
    pub fn resolve(&self, locator: &str) -> PathBuf {
        let locator = locator.strip_prefix("file://").unwrap_or(locator);
        match &self.root {
            Some(root) => root.join(locator.trim_start_matches('/')),
            None => PathBuf::from(locator),
        }
    }
}

impl FontFetcher for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<FetchResponse, FontLoadError> {
        let path = self.resolve(locator);
        match std::fs::read(&path) {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: Vec::new(),
            }),
            Err(e) => Err(FontLoadError::Fetch {
                locator: locator.to_string(),
                reason: format!("{}: {}", path.display(), e),
            }),
        }
    }
}

/// Fetches fonts over HTTP(S) with a blocking `reqwest` client.
#[cfg(feature = "http")]
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Creates a fetcher with a default blocking client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "http")]
impl FontFetcher for HttpFetcher {
    fn fetch(&self, locator: &str) -> Result<FetchResponse, FontLoadError> {
        let to_fetch_error = |e: reqwest::Error| FontLoadError::Fetch {
            locator: locator.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(locator).send().map_err(to_fetch_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(to_fetch_error)?.to_vec();

        Ok(FetchResponse { status, body })
    }
}

/// Routes `http(s)://` locators to [`HttpFetcher`] (feature `http`) and
/// everything else to [`FileFetcher`].
#[derive(Clone, Debug, Default)]
pub struct DefaultFetcher {
    pub files: FileFetcher,
    #[cfg(feature = "http")]
    pub http: HttpFetcher,
}

impl DefaultFetcher {
    /// Creates a fetcher that reads files through `files`.
    pub fn new(files: FileFetcher) -> Self {
        Self {
            files,
            #[cfg(feature = "http")]
            http: HttpFetcher::new(),
        }
    }
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

impl DefaultFetcher {
    #[cfg(feature = "http")]
    fn fetch_remote(&self, locator: &str) -> Result<FetchResponse, FontLoadError> {
        self.http.fetch(locator)
    }

    #[cfg(not(feature = "http"))]
    fn fetch_remote(&self, locator: &str) -> Result<FetchResponse, FontLoadError> {
        Err(FontLoadError::Fetch {
            locator: locator.to_string(),
            reason: "remote fonts require the `http` feature".to_string(),
        })
    }
}

impl FontFetcher for DefaultFetcher {
    fn fetch(&self, locator: &str) -> Result<FetchResponse, FontLoadError> {
        if is_remote(locator) {
            return self.fetch_remote(locator);
        }

        self.files.fetch(locator)
    }
}

/// Sniffs the leading bytes for an HTML document.
///
/// Static hosts commonly answer missing assets with an HTML page (sometimes
/// with a success status), which must never reach the font parser.
pub fn looks_like_html(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..bytes.len().min(start + 16)];

    const MARKERS: [&[u8]; 2] = [b"<!doctype", b"<html"];
    MARKERS.iter().any(|marker| {
        head.len() >= marker.len() && head[..marker.len()].eq_ignore_ascii_case(marker)
    })
}

/// Validates a response and parses it into a [`FontHandle`].
pub fn decode_response(
    locator: &str,
    response: FetchResponse,
) -> Result<FontHandle, FontLoadError> {
    if !response.is_success() {
        return Err(FontLoadError::HttpStatus {
            locator: locator.to_string(),
            status: response.status,
        });
    }

    if looks_like_html(&response.body) {
        return Err(FontLoadError::HtmlPayload {
            locator: locator.to_string(),
        });
    }

    FontHandle::from_bytes(response.body).map_err(|source| FontLoadError::Format {
        locator: locator.to_string(),
        source,
    })
}

/// Fetches and parses a font on the calling thread.
pub fn load_font(fetcher: &dyn FontFetcher, locator: &str) -> Result<FontHandle, FontLoadError> {
    let response = fetcher.fetch(locator)?;
    decode_response(locator, response)
}

/// Finished load waiting to be picked up by [`FontLoader::poll`].
struct CompletedLoad {
    generation: u64,
    result: Result<Arc<FontHandle>, FontLoadError>,
}

/// State shared with worker threads.
#[derive(Default)]
struct LoadSlot {
    latest: AtomicU64,
    completed: Mutex<Option<CompletedLoad>>,
}

impl LoadSlot {
    fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::Acquire) == generation
    }

    fn publish(&self, generation: u64, result: Result<Arc<FontHandle>, FontLoadError>) {
        if !self.is_current(generation) {
            log::debug!("Discarding stale font load (generation {})", generation);
            return;
        }

        let mut completed = self.completed.lock();
        // never let an older request overwrite a newer one
        if completed
            .as_ref()
            .is_some_and(|existing| existing.generation > generation)
        {
            return;
        }
        *completed = Some(CompletedLoad { generation, result });
    }
}

/// Asynchronous font loading with stale-response protection.
///
/// Each [`FontLoader::request`] bumps a generation counter and fetches on a
/// worker thread. Only the result of the latest generation is ever returned
/// from [`FontLoader::poll`]; anything older is dropped. Dropping the loader
/// abandons all in-flight requests.
pub struct FontLoader {
    fetcher: Arc<dyn FontFetcher>,
    slot: Arc<LoadSlot>,
    generation: u64,
    locator: Option<String>,
    in_flight: bool,
}

impl FontLoader {
    /// Creates an idle loader that fetches through `fetcher`.
    pub fn new(fetcher: Arc<dyn FontFetcher>) -> Self {
        Self {
            fetcher,
            slot: Arc::new(LoadSlot::default()),
            generation: 0,
            locator: None,
            in_flight: false,
        }
    }

    /// Starts loading `locator`, superseding any request still in flight.
    ///
    /// Returns the generation assigned to this request.
    pub fn request(&mut self, locator: impl Into<String>) -> u64 {
        let locator = locator.into();
        let generation = self.advance_generation();
        self.locator = Some(locator.clone());
        self.in_flight = true;

        let fetcher = Arc::clone(&self.fetcher);
        let slot = Arc::clone(&self.slot);
        let worker_locator = locator.clone();

        let spawned = std::thread::Builder::new()
            .name("fude-font-loader".to_string())
            .spawn(move || {
                let result = fetcher
                    .fetch(&worker_locator)
                    .and_then(|response| {
                        if !slot.is_current(generation) {
                            // Abandoned while fetching: skip the parse entirely.
                            return Err(FontLoadError::Fetch {
                                locator: worker_locator.clone(),
                                reason: "request superseded".to_string(),
                            });
                        }
                        decode_response(&worker_locator, response)
                    })
                    .map(Arc::new);
                slot.publish(generation, result);
            });

        if let Err(e) = spawned {
            self.slot.publish(
                generation,
                Err(FontLoadError::Fetch {
                    locator,
                    reason: format!("failed to spawn loader thread: {}", e),
                }),
            );
        }

        generation
    }

    /// Takes the result of the latest request if it has finished.
    ///
    /// Failures are logged here; the caller decides what to keep on screen.
    pub fn poll(&mut self) -> Option<Result<Arc<FontHandle>, FontLoadError>> {
        let completed = self.slot.completed.lock().take()?;

        if completed.generation != self.generation {
            log::debug!(
                "Dropping font load result of generation {} (current: {})",
                completed.generation,
                self.generation
            );
            return None;
        }

        self.in_flight = false;
        if let Err(e) = &completed.result {
            log::error!("Font load error for {}: {}", e.locator(), e);
        }
        Some(completed.result)
    }

    /// Abandons the in-flight request, if any. Its result will never be returned.
    pub fn abandon(&mut self) {
        if self.in_flight {
            log::debug!("Abandoning font load of {:?}", self.locator);
        }
        self.advance_generation();
        self.in_flight = false;
        *self.slot.completed.lock() = None;
    }

    /// Whether the latest request has not been picked up by `poll` yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Locator of the latest request.
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    /// Generation of the latest request or abandon.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn advance_generation(&mut self) -> u64 {
        self.generation += 1;
        self.slot.latest.store(self.generation, Ordering::Release);
        self.generation
    }
}

impl Drop for FontLoader {
    fn drop(&mut self) {
        self.abandon();
    }
}

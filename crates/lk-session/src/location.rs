//! Addressable-location access.
//!
//! At startup the synchronizer may find a one-time refresh credential
//! embedded in the current location's query string. The [`Location`]
//! trait is the seam through which it reads and strips that
//! credential, and through which it requests a clean reload when
//! redemption fails. Embedders bridge this to their navigation layer.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use url::Url;

/// The navigable location of the embedding context.
pub trait Location: Send + Sync {
    /// Reads a query parameter from the current location.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Removes a query parameter without reloading.
    fn remove_query_param(&self, name: &str);

    /// Requests a full reload of the (already cleaned) location.
    fn request_reload(&self);
}

/// [`Location`] implementation backed by an owned [`Url`].
///
/// The embedder keeps the URL current via [`UrlLocation::replace`] and
/// polls [`UrlLocation::reload_requested`] to act on forced reloads.
pub struct UrlLocation {
    url: RwLock<Url>,
    reload_requested: AtomicBool,
}

impl UrlLocation {
    /// Creates a location from a URL.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
            reload_requested: AtomicBool::new(false),
        }
    }

    /// Creates a location by parsing a URL string.
    ///
    /// ## Errors
    ///
    /// Returns the parse error for invalid URLs.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(input)?))
    }

    /// Returns the current URL.
    #[must_use]
    pub fn current(&self) -> Url {
        self.url.read().clone()
    }

    /// Replaces the current URL (e.g. after navigation).
    pub fn replace(&self, url: Url) {
        *self.url.write() = url;
    }

    /// Whether a forced reload has been requested.
    #[must_use]
    pub fn reload_requested(&self) -> bool {
        self.reload_requested.load(Ordering::SeqCst)
    }
}

impl Location for UrlLocation {
    fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .read()
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn remove_query_param(&self, name: &str) {
        let mut url = self.url.write();
        let remaining: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != name)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        if !remaining.is_empty() {
            url.query_pairs_mut().extend_pairs(remaining);
        }
    }

    fn request_reload(&self) {
        self.reload_requested.store(true, Ordering::SeqCst);
    }
}

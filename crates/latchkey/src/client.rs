//! The client composition root.

use std::sync::Arc;

use url::Url;

use lk_api::{AuthApi, HttpAuthApi, HttpStorageApi, StorageApi, TokenSource};
use lk_core::{Config, Error, Result};
use lk_invoke::Invoker;
use lk_model::Session;
use lk_security::{CeremonyProvider, ElevatedInvoker, ElevationController, UnsupportedCeremony};
use lk_session::{
    Location, MemorySessionStore, SessionStore, SessionSync, StoreTokenSource, UrlLocation,
};

use crate::context::SessionHandle;

pub(crate) struct ClientInner {
    pub(crate) config: Config,
    pub(crate) auth: Arc<dyn AuthApi>,
    pub(crate) storage: Arc<dyn StorageApi>,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) location: Arc<dyn Location>,
    pub(crate) sync: Arc<SessionSync>,
    pub(crate) elevation: Arc<ElevationController>,
}

/// The Latchkey client: the provider every other surface hangs off.
///
/// Cloning is cheap and shares the same underlying state. Session
/// state stays consistent for as long as one clone is alive; handles
/// outlive the last clone only in the sense that they fail loudly.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client with default collaborators for the config.
    ///
    /// ## Errors
    ///
    /// Configuration errors, e.g. unparsable backend URLs.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Starts building a client, allowing collaborators to be
    /// replaced before construction.
    #[must_use]
    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Starts the client: redeems any pending startup credential,
    /// settles the first session snapshot, and primes the
    /// security-key set.
    pub async fn start(&self) {
        self.inner.sync.start().await;
        self.inner.elevation.refresh_security_keys().await;
    }

    /// Returns a handle for reading session state.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(Arc::downgrade(&self.inner))
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The authentication namespace of the backend.
    #[must_use]
    pub fn auth(&self) -> Arc<dyn AuthApi> {
        Arc::clone(&self.inner.auth)
    }

    /// The storage namespace of the backend.
    #[must_use]
    pub fn storage(&self) -> Arc<dyn StorageApi> {
        Arc::clone(&self.inner.storage)
    }

    /// The session store.
    #[must_use]
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.inner.store)
    }

    /// The addressable location.
    #[must_use]
    pub fn location(&self) -> Arc<dyn Location> {
        Arc::clone(&self.inner.location)
    }

    /// The session synchronizer.
    #[must_use]
    pub fn synchronizer(&self) -> Arc<SessionSync> {
        Arc::clone(&self.inner.sync)
    }

    /// The elevation controller.
    #[must_use]
    pub fn elevation(&self) -> Arc<ElevationController> {
        Arc::clone(&self.inner.elevation)
    }

    /// Reads the current session straight from the store.
    #[must_use]
    pub fn user_session(&self) -> Option<Session> {
        self.inner.store.read()
    }

    /// Creates an invoker over the authentication namespace.
    #[must_use]
    pub fn auth_invoker<P: Clone, D>(&self) -> Invoker<Arc<dyn AuthApi>, P, D> {
        Invoker::new(Arc::clone(&self.inner.auth))
    }

    /// Creates an invoker over the storage namespace.
    #[must_use]
    pub fn storage_invoker<P: Clone, D>(&self) -> Invoker<Arc<dyn StorageApi>, P, D> {
        Invoker::new(Arc::clone(&self.inner.storage))
    }

    /// Creates an elevation-gated invoker over the authentication
    /// namespace for privileged operations.
    #[must_use]
    pub fn elevated_auth_invoker<P: Clone, D>(&self) -> ElevatedInvoker<Arc<dyn AuthApi>, P, D> {
        ElevatedInvoker::new(Arc::clone(&self.inner.auth), Arc::clone(&self.inner.elevation))
    }
}

/// Builder for [`Client`].
///
/// The backend handles default to HTTP implementations against the
/// configured URLs; the store, location, and ceremony provider default
/// to in-memory/unsupported implementations suitable for tests and
/// headless embedders.
pub struct ClientBuilder {
    config: Config,
    auth: Option<Arc<dyn AuthApi>>,
    storage: Option<Arc<dyn StorageApi>>,
    store: Option<Arc<dyn SessionStore>>,
    location: Option<Arc<dyn Location>>,
    ceremony: Option<Arc<dyn CeremonyProvider>>,
}

impl ClientBuilder {
    /// Creates a builder for the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            auth: None,
            storage: None,
            store: None,
            location: None,
            ceremony: None,
        }
    }

    /// Replaces the authentication backend.
    #[must_use]
    pub fn auth(mut self, auth: Arc<dyn AuthApi>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Replaces the storage backend.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn StorageApi>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replaces the session store.
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replaces the addressable location.
    #[must_use]
    pub fn location(mut self, location: Arc<dyn Location>) -> Self {
        self.location = Some(location);
        self
    }

    /// Replaces the credential ceremony provider.
    #[must_use]
    pub fn ceremony(mut self, ceremony: Arc<dyn CeremonyProvider>) -> Self {
        self.ceremony = Some(ceremony);
        self
    }

    /// Builds the client.
    ///
    /// ## Errors
    ///
    /// Configuration errors, e.g. unparsable backend URLs.
    pub fn build(self) -> Result<Client> {
        let config = self.config;

        let store: Arc<dyn SessionStore> = self
            .store
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let tokens: Arc<dyn TokenSource> = Arc::new(StoreTokenSource::new(Arc::clone(&store)));

        let auth: Arc<dyn AuthApi> = match self.auth {
            Some(auth) => auth,
            None => {
                let base_url = parse_url(&config.backend.auth_url)?;
                Arc::new(HttpAuthApi::new(base_url).with_token_source(Arc::clone(&tokens)))
            }
        };

        let storage: Arc<dyn StorageApi> = match self.storage {
            Some(storage) => storage,
            None => {
                let base_url = parse_url(&config.backend.storage_url)?;
                Arc::new(HttpStorageApi::new(base_url).with_token_source(tokens))
            }
        };

        let location: Arc<dyn Location> = match self.location {
            Some(location) => location,
            None => Arc::new(UrlLocation::parse("http://localhost/").map_err(
                |error| Error::Config(format!("default location: {error}")),
            )?),
        };

        let ceremony: Arc<dyn CeremonyProvider> = self
            .ceremony
            .unwrap_or_else(|| Arc::new(UnsupportedCeremony));

        let sync = SessionSync::new(
            Arc::clone(&auth),
            Arc::clone(&store),
            Arc::clone(&location),
            &config.session,
        );
        let elevation = Arc::new(ElevationController::new(
            Arc::clone(&auth),
            Arc::clone(&store),
            ceremony,
        ));

        Ok(Client {
            inner: Arc::new(ClientInner {
                config,
                auth,
                storage,
                store,
                location,
                sync,
                elevation,
            }),
        })
    }
}

fn parse_url(input: &str) -> Result<Url> {
    Url::parse(input).map_err(|error| Error::Config(format!("invalid backend URL {input}: {error}")))
}

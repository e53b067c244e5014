//! Zyvia Rust Client Library
//!
//! A Rust client for the Zyvia wardrobe service: authenticate, upload
//! clothing photographs, browse the wardrobe, and request generated or
//! recommended outfits. The server does all the heavy lifting; this crate
//! manages the local session and talks to the REST API.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod forms;
pub mod outfit;
pub mod resource;
pub mod session;
pub mod task;
pub mod wardrobe;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::Auth;
use crate::config::ClientOptions;
use crate::error::Error;
use crate::outfit::OutfitClient;
use crate::resource::{RecommendationResource, Resource, WardrobeResource};
use crate::session::{FileSessionStore, SessionContext};
use crate::wardrobe::{ClothingItem, WardrobeClient};

/// The main entry point for the Zyvia client
#[derive(Clone)]
pub struct Zyvia {
    /// Client options
    pub options: ClientOptions,
    /// HTTP client used for requests
    pub http_client: Client,
    session: SessionContext,
    auth: Auth,
    wardrobe: WardrobeClient,
    outfits: OutfitClient,
}

impl Zyvia {
    /// Create a client for `base_url` with the default session file
    ///
    /// # Example
    ///
    /// ```
    /// use zyvia::Zyvia;
    ///
    /// let zyvia = Zyvia::new("http://127.0.0.1:8000").unwrap();
    /// ```
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::new_with_options(ClientOptions::default().with_base_url(base_url))
    }

    /// Create a client configured from the environment
    pub fn from_env() -> Result<Self, Error> {
        Self::new_with_options(ClientOptions::from_env())
    }

    /// Create a client with custom options.
    ///
    /// The session is persisted to `options.session_path`, or to the per-user
    /// configuration directory when unset.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use zyvia::{Zyvia, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_base_url("http://192.168.31.169:8000")
    ///     .with_request_timeout(Some(Duration::from_secs(10)));
    /// let zyvia = Zyvia::new_with_options(options).unwrap();
    /// ```
    pub fn new_with_options(options: ClientOptions) -> Result<Self, Error> {
        let store = FileSessionStore::from_path(options.resolved_session_path());
        if store.path().is_none() {
            log::warn!("No configuration directory found; sessions will not be persisted");
        }
        Self::with_session(options, SessionContext::new(Arc::new(store)))
    }

    /// Create a client sharing an existing session
    pub fn with_session(options: ClientOptions, session: SessionContext) -> Result<Self, Error> {
        let mut builder = Client::builder().user_agent(options.user_agent.clone());
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(options.clone(), http_client.clone(), session.clone());
        let wardrobe = WardrobeClient::new(options.clone(), http_client.clone(), auth.clone());
        let outfits = OutfitClient::new(options.clone(), http_client.clone(), auth.clone());

        Ok(Self {
            options,
            http_client,
            session,
            auth,
            wardrobe,
            outfits,
        })
    }

    /// The shared session
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Get a reference to the wardrobe client
    pub fn wardrobe(&self) -> &WardrobeClient {
        &self.wardrobe
    }

    /// Get a reference to the outfit client
    pub fn outfits(&self) -> &OutfitClient {
        &self.outfits
    }

    /// A stateful fetcher for the wardrobe list
    pub fn wardrobe_resource(&self) -> WardrobeResource {
        Resource::new(self.wardrobe.clone(), self.session.clone())
    }

    /// A stateful fetcher for recommended outfits
    pub fn recommendation_resource(&self) -> RecommendationResource {
        Resource::new(self.outfits.clone(), self.session.clone())
    }

    /// Absolute URL of an item's image
    pub fn image_url(&self, item: &ClothingItem) -> String {
        self.wardrobe.image_url(item)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::ClientOptions;
    pub use crate::error::Error;
    pub use crate::forms::{
        GenerateOutfitForm, LoginForm, RegisterForm, SubmissionState, SubmissionStatus,
        UploadForm,
    };
    pub use crate::outfit::{Occasion, Outfit};
    pub use crate::session::{SessionContext, UserSession};
    pub use crate::wardrobe::{ClothingItem, ClothingType, ImageFile, Style};
    pub use crate::Zyvia;
}

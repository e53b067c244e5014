//! Stateful fetchers for list resources (wardrobe, recommendations)
//!
//! A [`Resource`] keeps `{ items, is_loading, error }` for one endpoint and
//! publishes every change on a watch channel. Fetches are skipped silently
//! when nobody is logged in, and a response is dropped if a newer fetch of
//! the same resource started while it was in flight.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::Error;
use crate::outfit::{Outfit, OutfitClient};
use crate::session::SessionContext;
use crate::wardrobe::{ClothingItem, WardrobeClient};

/// Something that can produce the full list for a resource
#[async_trait]
pub trait ResourceSource: Send + Sync + 'static {
    /// Element type of the list
    type Item: Clone + Send + Sync + 'static;

    /// Fetch the whole list
    async fn fetch(&self) -> Result<Vec<Self::Item>, Error>;

    /// Message shown when the fetch fails without a server-provided reason
    fn failure_message(&self) -> &'static str;
}

#[async_trait]
impl ResourceSource for WardrobeClient {
    type Item = ClothingItem;

    async fn fetch(&self) -> Result<Vec<ClothingItem>, Error> {
        self.list().await
    }

    fn failure_message(&self) -> &'static str {
        "Failed to fetch wardrobe items."
    }
}

#[async_trait]
impl ResourceSource for OutfitClient {
    type Item = Outfit;

    async fn fetch(&self) -> Result<Vec<Outfit>, Error> {
        self.recommendations().await
    }

    fn failure_message(&self) -> &'static str {
        "Failed to fetch recommendations."
    }
}

/// Snapshot of a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// The last successfully fetched list
    pub items: Vec<T>,

    /// Whether a fetch is in flight
    pub is_loading: bool,

    /// Message describing the last failure
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            error: None,
        }
    }
}

/// A list resource bound to the shared session
pub struct Resource<S: ResourceSource> {
    source: Arc<S>,
    session: SessionContext,
    state: Arc<watch::Sender<ResourceState<S::Item>>>,
    generation: Arc<AtomicU64>,
}

/// The user's wardrobe
pub type WardrobeResource = Resource<WardrobeClient>;

/// Recommended outfits
pub type RecommendationResource = Resource<OutfitClient>;

impl<S: ResourceSource> Clone for Resource<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            session: self.session.clone(),
            state: self.state.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<S: ResourceSource> Resource<S> {
    /// Create a resource in its initial empty state
    pub fn new(source: S, session: SessionContext) -> Self {
        let (state, _rx) = watch::channel(ResourceState::default());
        Self {
            source: Arc::new(source),
            session,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current snapshot
    pub fn state(&self) -> ResourceState<S::Item> {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<S::Item>> {
        self.state.subscribe()
    }

    /// Fetch only when `is_active`, somebody is logged in, and nothing is
    /// cached yet. Returns whether a fetch ran.
    pub async fn activate(&self, is_active: bool) -> bool {
        let has_items = !self.state.borrow().items.is_empty();
        if !is_active || has_items {
            return false;
        }
        self.refetch().await
    }

    /// Fetch the list now. Returns whether a fetch ran.
    pub async fn refetch(&self) -> bool {
        if self.session.current().await.is_none() {
            log::debug!("Skipping fetch: not logged in");
            return false;
        }

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.is_loading = true;
            state.error = None;
        });

        let result = self.source.fetch().await;

        let failure_message = self.source.failure_message();
        // Generation check and write share one borrow, so a newer fetch
        // cannot start in between.
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                log::debug!("Discarding stale response (generation {})", generation);
                return false;
            }

            state.is_loading = false;
            match result {
                Ok(items) => state.items = items,
                Err(Error::InvalidResponse(message)) => {
                    log::warn!("Invalid response: {}", message);
                    state.error = Some(message);
                    state.items.clear();
                }
                Err(err) => {
                    log::warn!("Fetch failed: {}", err);
                    state.error = Some(err.user_message(failure_message));
                }
            }
            true
        });

        true
    }

    /// Drop cached items and errors, e.g. after logout
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = ResourceState::default();
        });
    }
}

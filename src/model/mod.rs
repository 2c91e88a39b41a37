//! The subscription core: a `ModelManager` that owns the subscriber store and
//! performs the check-then-insert sequence atomically.

mod store;

pub use store::{MemoryStore, SubscriberStore};

use std::sync::Arc;

use strum_macros::AsRefStr;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::web::types::ValidEmail;

#[derive(Clone)]
pub struct ModelManager {
    store: Arc<Mutex<Box<dyn SubscriberStore>>>,
}

impl ModelManager {
    pub fn new(store: impl SubscriberStore + 'static) -> Self {
        info!(
            "{:<12} - Initializing the store with {} subscriber(s)",
            "init_store",
            store.len()
        );

        let store: Box<dyn SubscriberStore> = Box::new(store);
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Builds a `ModelManager` backed by a `MemoryStore` containing `seed`.
    pub fn in_memory(seed: impl IntoIterator<Item = ValidEmail>) -> Self {
        Self::new(MemoryStore::with_seed(seed))
    }

    /// Records `email` as a subscriber, or fails with `Error::DuplicateSubscription` if it
    /// was already recorded. The store stays locked between the check and the insert so that
    /// concurrent calls with the same address see exactly one success.
    pub async fn subscribe(&self, email: ValidEmail) -> Result<ValidEmail> {
        let mut store = self.store.lock().await;

        if store.contains(&email)? {
            debug!("{:<12} - {email} is already subscribed", "subscribe");
            return Err(Error::DuplicateSubscription);
        }
        store.insert(email.clone())?;

        Ok(email)
    }

    pub async fn is_subscribed(&self, email: &ValidEmail) -> Result<bool> {
        self.store.lock().await.contains(email)
    }

    pub async fn subscriber_count(&self) -> usize {
        self.store.lock().await.len()
    }
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager").finish_non_exhaustive()
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("email is already subscribed")]
    DuplicateSubscription,
    #[error("subscriber store unavailable: {0}")]
    StoreUnavailable(String),
}

use std::collections::HashSet;

use super::Result;
use crate::web::types::ValidEmail;

/// The storage collaborator holding every subscribed address.
///
/// Implementors only ever see normalized addresses (`ValidEmail`), and don't need to
/// synchronize anything themselves: `ModelManager` holds the store behind a lock for the
/// whole check-then-insert sequence.
pub trait SubscriberStore: Send + Sync {
    fn contains(&self, email: &ValidEmail) -> Result<bool>;
    fn insert(&mut self, email: ValidEmail) -> Result<()>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process, non-durable store. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore(HashSet<String>);

impl MemoryStore {
    pub fn with_seed(seed: impl IntoIterator<Item = ValidEmail>) -> Self {
        Self(seed.into_iter().map(ValidEmail::into_inner).collect())
    }
}

impl SubscriberStore for MemoryStore {
    fn contains(&self, email: &ValidEmail) -> Result<bool> {
        Ok(self.0.contains(email.as_ref()))
    }

    fn insert(&mut self, email: ValidEmail) -> Result<()> {
        self.0.insert(email.into_inner());
        Ok(())
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

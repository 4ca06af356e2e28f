//! Data providers backing the default CRUD handlers, and the in-memory provider.

use crate::model::ApiModel;
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use std::sync::RwLock;

/// Async source of truth for one resource. Bound to routes with
/// [`Binder::bind_provider`](crate::Binder::bind_provider).
#[async_trait]
pub trait DataProvider<T: ApiModel>: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<T>>;

    async fn get(&self, id: &T::Key) -> anyhow::Result<Option<T>>;

    /// Stores `model` and returns it as stored.
    async fn create(&self, model: T) -> anyhow::Result<T>;

    async fn update(&self, id: &T::Key, model: T) -> anyhow::Result<()>;

    async fn delete(&self, id: &T::Key) -> anyhow::Result<()>;
}

/// List-backed provider, in insertion order. Keys must be unique.
pub struct InMemoryStore<T> {
    items: RwLock<Vec<T>>,
}

impl<T: ApiModel> Default for InMemoryStore<T> {
    fn default() -> Self {
        InMemoryStore {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T: ApiModel> InMemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(items: Vec<T>) -> Self {
        InMemoryStore {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl<T: ApiModel> DataProvider<T> for InMemoryStore<T> {
    async fn list(&self) -> anyhow::Result<Vec<T>> {
        Ok(self.items.read().map_err(|_| poisoned())?.clone())
    }

    async fn get(&self, id: &T::Key) -> anyhow::Result<Option<T>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().find(|item| item.key() == *id).cloned())
    }

    async fn create(&self, model: T) -> anyhow::Result<T> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let key = model.key();
        if items.iter().any(|item| item.key() == key) {
            bail!("{} {} already exists", T::RESOURCE, key);
        }
        items.push(model.clone());
        Ok(model)
    }

    async fn update(&self, id: &T::Key, model: T) -> anyhow::Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        match items.iter_mut().find(|item| item.key() == *id) {
            Some(slot) => {
                *slot = model;
                Ok(())
            }
            None => bail!("{} {} does not exist", T::RESOURCE, id),
        }
    }

    async fn delete(&self, id: &T::Key) -> anyhow::Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.retain(|item| item.key() != *id);
        Ok(())
    }
}

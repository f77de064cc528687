// src/db/memory_store.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::{
    common::error::AppError,
    db::documents::{new_document_id, Collection, DocumentStore, Filter, StoredDocument},
};

const CHANGE_FEED_CAPACITY: usize = 256;

/// Document store em memória: modo offline (sem DATABASE_URL) e testes.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
    changes: broadcast::Sender<Collection>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn notify(&self, collection: Collection) {
        // Sem assinantes não é erro
        let _ = self.changes.send(collection);
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| StoredDocument { id: id.to_string(), data: data.clone() }))
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| Filter::matches_all(filters, data))
                    .map(|(id, data)| StoredDocument { id: id.clone(), data: data.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, data: Value) -> Result<String, AppError> {
        let id = new_document_id();
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.clone(), data);
        self.notify(collection);
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, data: Value) -> Result<(), AppError> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_string(), data);
        self.notify(collection);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, patch: Value) -> Result<(), AppError> {
        {
            let mut collections = self.collections.write().await;
            let doc = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| AppError::DocumentNotFound {
                    collection: collection.name(),
                    id: id.to_string(),
                })?;
            merge(doc, patch);
        }
        self.notify(collection);
        Ok(())
    }

    async fn update_where(
        &self,
        collection: Collection,
        id: &str,
        conditions: &[Filter],
        patch: Value,
    ) -> Result<bool, AppError> {
        let updated = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(&collection).and_then(|docs| docs.get_mut(id)) {
                Some(doc) if Filter::matches_all(conditions, doc) => {
                    merge(doc, patch);
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.notify(collection);
        }
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool, AppError> {
        let removed = self
            .collections
            .write()
            .await
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.notify(collection);
        }
        Ok(removed)
    }

    async fn delete_many(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<StoredDocument>, AppError> {
        let removed: Vec<StoredDocument> = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(&collection) {
                Some(docs) => {
                    let (gone, kept): (BTreeMap<String, Value>, BTreeMap<String, Value>) = std::mem::take(docs)
                        .into_iter()
                        .partition(|(_, data)| Filter::matches_all(filters, data));
                    *docs = kept;
                    gone.into_iter().map(|(id, data)| StoredDocument { id, data }).collect()
                }
                None => Vec::new(),
            }
        };
        if !removed.is_empty() {
            self.notify(collection);
        }
        Ok(removed)
    }

    async fn create_unique(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
        unique: &[Filter],
    ) -> Result<bool, AppError> {
        // Verificação e escrita sob o mesmo lock
        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection).or_default();
            let taken = docs.contains_key(id)
                || (!unique.is_empty() && docs.values().any(|existing| Filter::matches_all(unique, existing)));
            if taken {
                return Ok(false);
            }
            docs.insert(id.to_string(), data);
        }
        self.notify(collection);
        Ok(true)
    }

    fn changes(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }
}

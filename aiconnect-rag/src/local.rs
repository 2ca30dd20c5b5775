//! Local directory vector store.
//!
//! [`LocalVectorStore`] keeps one sub-directory per collection under a root
//! directory, each holding an `index.json` with the schema, load state and
//! records. Data survives restarts; listing collections is a directory walk.
//!
//! ```text
//! vector_db/
//! ├── collection_5d41402abc4b2a76b9719d911017c592/
//! │   └── index.json
//! └── collection_7d793037a0760186574b0282f2f435e7/
//!     └── index.json
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::document::{EmbeddingRecord, SearchHit};
use crate::error::{RagError, Result};
use crate::inmemory::{StoredCollection, duplicate_collection, missing_collection};
use crate::schema::CollectionSchema;
use crate::vectorstore::VectorStore;

const BACKEND: &str = "local";
const INDEX_FILE: &str = "index.json";

/// A [`VectorStore`] persisted as JSON files in a directory tree.
///
/// Collections are read lazily and cached; every mutation rewrites the
/// collection's index atomically (temp file + rename) before the cache is
/// updated.
#[derive(Debug)]
pub struct LocalVectorStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, StoredCollection>>,
}

impl LocalVectorStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| io_error(&root, e))?;
        debug!(root = %root.display(), "opened local vector store");
        Ok(Self { root, cache: RwLock::new(HashMap::new()) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(INDEX_FILE)
    }

    async fn read_index(&self, name: &str) -> Result<Option<StoredCollection>> {
        if !is_valid_name(name) {
            return Ok(None);
        }
        let path = self.index_path(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        let collection = serde_json::from_slice(&bytes).map_err(|e| {
            RagError::store(BACKEND, format!("corrupt index {}: {e}", path.display()))
        })?;
        Ok(Some(collection))
    }

    async fn write_index(&self, name: &str, collection: &StoredCollection) -> Result<()> {
        let path = self.index_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| io_error(parent, e))?;
        }
        let bytes = serde_json::to_vec(collection)
            .map_err(|e| RagError::store(BACKEND, format!("failed to serialize '{name}': {e}")))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &bytes).await.map_err(|e| io_error(&temp_path, e))?;
        fs::rename(&temp_path, &path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %path.display(), error = %e, "rename failed");
            io_error(&path, e)
        })?;
        debug!(collection = name, bytes = bytes.len(), "wrote collection index");
        Ok(())
    }

    /// Cached collection, reading its index on first access.
    async fn cached<'a>(
        &self,
        cache: &'a mut HashMap<String, StoredCollection>,
        name: &str,
    ) -> Result<Option<&'a mut StoredCollection>> {
        if !cache.contains_key(name) {
            if let Some(collection) = self.read_index(name).await? {
                cache.insert(name.to_string(), collection);
            }
        }
        Ok(cache.get_mut(name))
    }

    /// Apply `change` to a copy of the collection, persist it, then publish
    /// it to the cache.
    async fn update<T>(
        &self,
        name: &str,
        change: impl FnOnce(&mut StoredCollection) -> Result<T>,
    ) -> Result<T> {
        let mut cache = self.cache.write().await;
        let current =
            self.cached(&mut cache, name).await?.ok_or_else(|| missing_collection(BACKEND, name))?;
        let mut updated = current.clone();
        let output = change(&mut updated)?;
        self.write_index(name, &updated).await?;
        cache.insert(name.to_string(), updated);
        Ok(output)
    }
}

/// Collection names become directory names, so only `[A-Za-z0-9_-]` is
/// accepted.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn io_error(path: &Path, e: std::io::Error) -> RagError {
    RagError::store(BACKEND, format!("{}: {e}", path.display()))
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        if self.cache.read().await.contains_key(name) {
            return Ok(true);
        }
        if !is_valid_name(name) {
            return Ok(false);
        }
        let path = self.index_path(name);
        fs::try_exists(&path).await.map_err(|e| io_error(&path, e))
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| io_error(&self.root, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&self.root, e))? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_valid_name(&name) {
                continue;
            }
            let index = entry.path().join(INDEX_FILE);
            if fs::try_exists(&index).await.map_err(|e| io_error(&index, e))? {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn create_collection(&self, name: &str, schema: &CollectionSchema) -> Result<()> {
        if !is_valid_name(name) {
            return Err(RagError::store(BACKEND, format!("invalid collection name '{name}'")));
        }
        schema.validate()?;

        let mut cache = self.cache.write().await;
        if self.cached(&mut cache, name).await?.is_some() {
            return Err(duplicate_collection(BACKEND, name));
        }
        let collection = StoredCollection::new(schema.clone());
        self.write_index(name, &collection).await?;
        cache.insert(name.to_string(), collection);
        debug!(collection = name, metric = %schema.metric, "created local collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if !is_valid_name(name) {
            return Ok(());
        }
        let mut cache = self.cache.write().await;
        let dir = self.root.join(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&dir, e)),
        }
        cache.remove(name);
        debug!(collection = name, "deleted local collection");
        Ok(())
    }

    async fn insert(&self, collection: &str, records: &[EmbeddingRecord]) -> Result<Vec<u64>> {
        self.update(collection, |stored| stored.insert(BACKEND, collection, records)).await
    }

    async fn load(&self, collection: &str) -> Result<()> {
        self.update(collection, |stored| {
            stored.loaded = true;
            Ok(())
        })
        .await
    }

    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        {
            let cache = self.cache.read().await;
            if let Some(stored) = cache.get(collection) {
                return stored.search(BACKEND, collection, vector, top_k);
            }
        }
        let mut cache = self.cache.write().await;
        let stored = self
            .cached(&mut cache, collection)
            .await?
            .ok_or_else(|| missing_collection(BACKEND, collection))?;
        stored.search(BACKEND, collection, vector, top_k)
    }
}

use std::{marker::PhantomData, path::{Path, PathBuf}};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Generic JSON file-backed document store.
///
/// Holds no copy of the document in memory: every read goes to disk, and
/// every update runs load → mutate → save while holding the exclusive side
/// of `gate`. Writes land in a temp file that is renamed over the target, so
/// concurrent readers see either the old or the new document, never a torn one.
pub struct JsonDocumentStore<T> {
    file_path: PathBuf,
    gate: RwLock<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    /// Bind the store to a path. No I/O happens until `initialize` or the first access.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), gate: RwLock::new(()), _doc: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Create the parent directory and a default document if the file is missing.
    /// An existing file is left untouched, even when it does not parse.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let _guard = self.gate.write().await;
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ServiceError::StorageWrite(format!("cannot create {}: {e}", parent.display())))?;
            }
        }
        match fs::try_exists(&self.file_path).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(path = %self.file_path.display(), "creating empty document");
                self.persist(&T::default()).await
            }
            Err(e) => Err(ServiceError::StorageWrite(format!("cannot stat {}: {e}", self.file_path.display()))),
        }
    }

    /// Strict read: surfaces missing or corrupt content as `StorageRead`.
    pub async fn try_read(&self) -> Result<T, ServiceError> {
        let _guard = self.gate.read().await;
        self.read_from_disk().await
    }

    /// Fail-open read: a missing or corrupt document yields `T::default()`.
    pub async fn read(&self) -> T {
        let _guard = self.gate.read().await;
        self.read_or_default().await
    }

    /// Replace the whole document.
    pub async fn write(&self, doc: &T) -> Result<(), ServiceError> {
        let _guard = self.gate.write().await;
        self.persist(doc).await
    }

    /// Apply a mutation to the current on-disk document and persist it.
    /// Nothing is written when `f` returns an error.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError>,
    {
        let _guard = self.gate.write().await;
        let mut doc = self.read_or_default().await;
        let out = f(&mut doc)?;
        self.persist(&doc).await?;
        Ok(out)
    }

    async fn read_from_disk(&self) -> Result<T, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::StorageRead(format!("cannot read {}: {e}", self.file_path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::StorageRead(format!("cannot parse {}: {e}", self.file_path.display())))
    }

    async fn read_or_default(&self) -> T {
        match self.read_from_disk().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "falling back to empty document");
                T::default()
            }
        }
    }

    async fn persist(&self, doc: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(|e| ServiceError::StorageWrite(e.to_string()))?;
        let temp_path = self.file_path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        if let Err(e) = fs::write(&temp_path, data).await {
            return Err(ServiceError::StorageWrite(format!("cannot write {}: {e}", temp_path.display())));
        }
        if let Err(e) = fs::rename(&temp_path, &self.file_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(ServiceError::StorageWrite(format!("cannot replace {}: {e}", self.file_path.display())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_doc() -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_doc_store_{}", Uuid::new_v4()))
            .join("doc.json")
    }

    #[tokio::test]
    async fn initialize_creates_default_once() -> Result<(), anyhow::Error> {
        let path = temp_doc();
        let store = JsonDocumentStore::<BTreeMap<String, u32>>::new(&path);
        store.initialize().await?;
        assert!(store.try_read().await?.is_empty());

        store.update(|m| { m.insert("a".into(), 1); Ok(()) }).await?;
        // idempotent: existing content survives a second initialize
        store.initialize().await?;
        assert_eq!(store.read().await.get("a"), Some(&1));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_default_but_try_read_errors() -> Result<(), anyhow::Error> {
        let path = temp_doc();
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(&path, b"{ not json").await?;

        let store = JsonDocumentStore::<BTreeMap<String, u32>>::new(&path);
        assert!(store.read().await.is_empty());
        assert!(matches!(store.try_read().await, Err(ServiceError::StorageRead(_))));

        // initialize never clobbers an existing file
        store.initialize().await?;
        assert_eq!(tokio::fs::read(&path).await?, b"{ not json");

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() -> Result<(), anyhow::Error> {
        let path = temp_doc();
        let store = JsonDocumentStore::<BTreeMap<String, u32>>::new(&path);
        store.initialize().await?;
        let res: Result<(), _> = store
            .update(|m| {
                m.insert("x".into(), 9);
                Err(ServiceError::Validation("nope".into()))
            })
            .await;
        assert!(res.is_err());
        assert!(store.read().await.is_empty());

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_into_missing_directory_is_a_write_error() {
        let path = std::env::temp_dir()
            .join(format!("json_doc_store_missing_{}", Uuid::new_v4()))
            .join("doc.json");
        let store = JsonDocumentStore::<BTreeMap<String, u32>>::new(&path);
        let err = store.write(&BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::StorageWrite(_)));
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() -> Result<(), anyhow::Error> {
        let path = temp_doc();
        let store = JsonDocumentStore::<BTreeMap<String, u32>>::new(&path);
        store.initialize().await?;
        for i in 0..5 {
            store.update(|m| { m.insert(format!("k{i}"), i); Ok(()) }).await?;
        }
        let mut entries = tokio::fs::read_dir(path.parent().unwrap()).await?;
        let mut names = Vec::new();
        while let Some(e) = entries.next_entry().await? {
            names.push(e.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["doc.json".to_string()]);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}

//! Storage for files uploaded through the terminal.

use std::time::SystemTime;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::context::HostContext;

/// A file received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: usize,
    pub uploaded_by: Option<String>,
    pub uploaded_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub info: FileInfo,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `file` and returns its id.
    async fn store(&self, file: FileUpload, host: &HostContext) -> anyhow::Result<String>;

    async fn list(&self) -> anyhow::Result<Vec<FileInfo>>;

    async fn get(&self, id: &str) -> anyhow::Result<Option<StoredFile>>;

    /// Returns whether a file was removed.
    async fn remove(&self, id: &str) -> anyhow::Result<bool>;
}

/// In-process storage; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryFileStorage {
    files: DashMap<String, StoredFile>,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn store(&self, file: FileUpload, host: &HostContext) -> anyhow::Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let info = FileInfo {
            id: id.clone(),
            name: file.name,
            mime_type: file.mime_type,
            size: file.data.len(),
            uploaded_by: host.user.clone(),
            uploaded_at: SystemTime::now(),
        };
        self.files.insert(
            id.clone(),
            StoredFile {
                info,
                data: file.data,
            },
        );
        Ok(id)
    }

    async fn list(&self) -> anyhow::Result<Vec<FileInfo>> {
        let mut files: Vec<_> = self.files.iter().map(|f| f.info.clone()).collect();
        files.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<StoredFile>> {
        Ok(self.files.get(id).map(|f| f.clone()))
    }

    async fn remove(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.files.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, data: &[u8]) -> FileUpload {
        FileUpload {
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            data: data.to_vec(),
        }
    }

    #[tokio::test]
    async fn store_get_remove() {
        let storage = MemoryFileStorage::new();
        let host = HostContext::anonymous().with_user("alice");
        let id = storage.store(upload("notes.txt", b"hello"), &host).await.unwrap();

        let stored = storage.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.data, b"hello");
        assert_eq!(stored.info.size, 5);
        assert_eq!(stored.info.uploaded_by.as_deref(), Some("alice"));

        assert_eq!(storage.list().await.unwrap().len(), 1);
        assert!(storage.remove(&id).await.unwrap());
        assert!(!storage.remove(&id).await.unwrap());
        assert!(storage.get(&id).await.unwrap().is_none());
    }
}

use anyhow::Result;
use async_trait::async_trait;

#[cfg(target_arch = "wasm32")]
pub trait StorageBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> StorageBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait StorageBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> StorageBounds for T {}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Storage: StorageBounds {
    async fn write(&self, path: &str, content: &[u8]) -> Result<()>;
    async fn exists(&self, path: &str) -> Result<bool>;
}

// --- Native Implementation ---

#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct NativeStorage;

#[cfg(not(target_arch = "wasm32"))]
impl NativeStorage {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl Storage for NativeStorage {
    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }
}

// --- In-memory Implementation ---

#[cfg(test)]
pub(crate) use memory::MemoryStorage;


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_native_storage_creates_parent_dirs() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("nested").join("script.txt");
        let path = path.to_string_lossy().to_string();

        let storage = NativeStorage::new();
        assert!(!storage.exists(&path).await?);
        storage.write(&path, b"Hello").await?;
        assert!(storage.exists(&path).await?);
        assert_eq!(tokio::fs::read(&path).await?, b"Hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_storage_roundtrip() -> Result<()> {
        let storage = MemoryStorage::new();
        assert!(storage.get("missing.txt").is_err());
        storage.write("b.txt", b"b").await?;
        storage.write("a.txt", b"a").await?;
        assert!(storage.exists("a.txt").await?);
        assert_eq!(storage.paths(), vec!["a.txt", "b.txt"]);
        Ok(())
    }
}

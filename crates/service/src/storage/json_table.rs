use std::{marker::PhantomData, path::{Path, PathBuf}};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// A whole table persisted as one JSON array file.
///
/// There are no partial updates: `load` reads the full array and `save`
/// rewrites it. Writes land in a sibling temp file that is renamed over the
/// table after being synced to disk, so readers never observe a half-written
/// array and a crash leaves either the old or the new table.
#[derive(Debug, Clone)]
pub struct JsonTable<T> {
    file_path: PathBuf,
    _row: PhantomData<fn() -> T>,
}

impl<T> JsonTable<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), _row: PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Create the parent directory and an empty `[]` table if the file is missing.
    pub async fn ensure(&self) -> Result<(), ServiceError> {
        if fs::metadata(&self.file_path).await.is_ok() {
            return Ok(());
        }
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| ServiceError::io(parent, e))?;
            }
        }
        debug!(path = %self.file_path.display(), "initializing empty table");
        fs::write(&self.file_path, b"[]").await.map_err(|e| ServiceError::io(&self.file_path, e))
    }

    /// Read every row. An empty file reads as an empty table.
    pub async fn load(&self) -> Result<Vec<T>, ServiceError> {
        self.ensure().await?;
        let bytes = fs::read(&self.file_path).await.map_err(|e| ServiceError::io(&self.file_path, e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.file_path.display(), err = %e, "table is not a valid JSON array");
            ServiceError::Serde(e)
        })
    }

    /// Replace the table contents with `rows`.
    pub async fn save(&self, rows: &[T]) -> Result<(), ServiceError> {
        self.ensure().await?;
        let data = serde_json::to_vec_pretty(rows)?;
        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp).await.map_err(|e| ServiceError::io(&tmp, e))?;
        file.write_all(&data).await.map_err(|e| ServiceError::io(&tmp, e))?;
        // the bytes must be durable before the rename makes them visible
        file.sync_all().await.map_err(|e| ServiceError::io(&tmp, e))?;
        drop(file);
        fs::rename(&tmp, &self.file_path).await.map_err(|e| ServiceError::io(&self.file_path, e))?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.file_path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        n: u32,
    }

    fn tmp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("json_table_{}", uuid::Uuid::new_v4()))
            .join("rows.json")
    }

    #[tokio::test]
    async fn missing_file_is_created_as_empty_array() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let table = JsonTable::<Row>::new(&path);

        assert!(table.load().await?.is_empty());
        let raw = tokio::fs::read_to_string(&path).await?;
        assert_eq!(raw, "[]");

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_rewrites_whole_table_and_reloads() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let table = JsonTable::<Row>::new(&path);

        let rows = vec![Row { id: "a".into(), n: 1 }, Row { id: "b".into(), n: 2 }];
        table.save(&rows).await?;
        table.save(&rows[1..]).await?;

        // a fresh handle sees only the last write, and no temp file is left behind
        let leftovers = std::fs::read_dir(path.parent().unwrap())?
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
        let reloaded = JsonTable::<Row>::new(&path).load().await?;
        assert_eq!(reloaded, vec![Row { id: "b".into(), n: 2 }]);

        // human readable on disk
        let raw = tokio::fs::read_to_string(&path).await?;
        assert!(raw.contains("\n  {"));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn blank_file_reads_as_empty_and_garbage_fails() -> Result<(), anyhow::Error> {
        let path = tmp_file();
        let table = JsonTable::<Row>::new(&path);
        table.ensure().await?;

        tokio::fs::write(&path, "  \n").await?;
        assert!(table.load().await?.is_empty());

        tokio::fs::write(&path, "{not json").await?;
        assert!(matches!(table.load().await, Err(ServiceError::Serde(_))));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}

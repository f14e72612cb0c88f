use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error};

use super::LensStorage;
use crate::errors::ServiceError;
use crate::lens::domain::{Lens, PersistedDocument, PersistedDocumentRef};

/// JSON file holding `{ "lenses": [...] }`.
///
/// Every save rewrites the whole document into a sibling `.tmp` file and
/// renames it over the target, so readers never observe a partial write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "lenses.json".into());
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

#[async_trait]
impl LensStorage for JsonFileStore {
    async fn load(&self) -> Result<Vec<Lens>, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "data file missing; empty collection");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "failed to read data file");
                return Err(ServiceError::storage("read data file", e));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let doc: PersistedDocument = serde_json::from_slice(&bytes).map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "data file is not a valid lens document");
            ServiceError::storage("parse data file", e)
        })?;
        Ok(doc.lenses)
    }

    async fn save(&self, lenses: &[Lens]) -> Result<(), ServiceError> {
        let mut data = serde_json::to_vec_pretty(&PersistedDocumentRef { lenses })
            .map_err(|e| ServiceError::storage("serialize lenses", e))?;
        data.push(b'\n');

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage("create data dir", e))?;
        }
        let tmp = self.tmp_path();
        let written = async {
            fs::write(&tmp, &data).await?;
            fs::rename(&tmp, &self.file_path).await
        }
        .await;
        if let Err(e) = written {
            error!(path = %self.file_path.display(), error = %e, "failed to write data file");
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::storage("write data file", e));
        }
        debug!(path = %self.file_path.display(), count = lenses.len(), "data file written");
        Ok(())
    }
}

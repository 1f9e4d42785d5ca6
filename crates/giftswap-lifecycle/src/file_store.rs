//! Signup-window record persisted as a JSON file.
//!
//! Writes go to a sibling temp file that is then renamed over the record,
//! so a crash mid-write leaves either the old or the new record on disk,
//! never a mix of the two.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use giftswap_types::{Result, SignupWindow};

use crate::ports::WindowStore;

#[derive(Debug, Clone)]
pub struct JsonFileWindowStore {
    path: PathBuf,
}

impl JsonFileWindowStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl WindowStore for JsonFileWindowStore {
    async fn load(&self) -> Result<SignupWindow> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(SignupWindow::inactive()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, window: &SignupWindow) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(window)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), active = window.active, "Signup window persisted");
        Ok(())
    }
}

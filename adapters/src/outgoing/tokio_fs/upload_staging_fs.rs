use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use domain::generation::{ImagePayload, StagedUpload};
use stylist_application::{
    error::{AppError, AppResult},
    ports::outgoing::upload_staging::UploadStagingPort,
};

/// Stages each upload as `<staging_dir>/<uuid>` for the lifetime of one
/// request.
pub struct FsUploadStaging {
    dir: PathBuf,
    max_bytes: usize,
}

fn storage_error(action: &str, e: &IoError) -> AppError {
    AppError::UploadStorageError {
        message: format!("Failed to {action} staged upload: {e}"),
    }
}

impl FsUploadStaging {
    /// Creates the staging directory and removes uploads left behind by a
    /// previous run. Only UUID-named files are touched.
    pub async fn open(dir: impl Into<PathBuf>, max_bytes: usize) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let swept = sweep_stale(&dir).await?;
        info!(
            staging_dir = %dir.display(),
            max_bytes,
            swept,
            "Upload staging ready"
        );

        Ok(Self { dir, max_bytes })
    }

    fn path_for(&self, upload: &StagedUpload) -> PathBuf {
        self.dir.join(upload.id.to_string())
    }
}

async fn sweep_stale(dir: &Path) -> AppResult<usize> {
    let mut entries = fs::read_dir(dir).await?;
    let mut swept = 0;

    while let Some(entry) = entries.next_entry().await? {
        let is_staged = entry
            .file_name()
            .to_str()
            .is_some_and(|name| Uuid::parse_str(name).is_ok());
        if !is_staged || !entry.file_type().await?.is_file() {
            continue;
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => swept += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to sweep stale upload"),
        }
    }

    Ok(swept)
}

#[async_trait::async_trait]
impl UploadStagingPort for FsUploadStaging {
    #[instrument(skip(self))]
    async fn begin(&self, media_type: &str) -> AppResult<StagedUpload> {
        let upload = StagedUpload::new(media_type);
        fs::File::create(self.path_for(&upload))
            .await
            .map_err(|e| storage_error("create", &e))?;

        debug!(upload_id = %upload.id, "Staging upload");
        Ok(upload)
    }

    async fn append(&self, upload: &StagedUpload, chunk: &[u8]) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.path_for(upload))
            .await
            .map_err(|e| storage_error("open", &e))?;

        let written = file
            .metadata()
            .await
            .map_err(|e| storage_error("inspect", &e))?
            .len();
        let limit = u64::try_from(self.max_bytes).unwrap_or(u64::MAX);
        let incoming = u64::try_from(chunk.len()).unwrap_or(u64::MAX);
        if written.saturating_add(incoming) > limit {
            return Err(AppError::PayloadTooLarge {
                message: format!("Image exceeds the {} byte upload limit", self.max_bytes),
            });
        }

        file.write_all(chunk)
            .await
            .map_err(|e| storage_error("write", &e))?;
        file.flush().await.map_err(|e| storage_error("flush", &e))
    }

    async fn load(&self, upload: &StagedUpload) -> AppResult<ImagePayload> {
        let bytes = fs::read(self.path_for(upload))
            .await
            .map_err(|e| storage_error("read", &e))?;
        Ok(ImagePayload::new(bytes, upload.media_type.clone())?)
    }

    async fn discard(&self, upload: &StagedUpload) {
        match fs::remove_file(self.path_for(upload)).await {
            Ok(()) => debug!(upload_id = %upload.id, "Staged upload removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(upload_id = %upload.id, error = %e, "Failed to remove staged upload"),
        }
    }
}

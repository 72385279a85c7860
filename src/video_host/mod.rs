/// External video host integration
///
/// Ingest, transcoding and playback-id issuance are done by the host; MIRA
/// only issues direct-upload tickets, polls their status, and lists or
/// deletes remote assets.

pub mod bridge;
pub mod mux;

pub use bridge::{AnnotatedAsset, AssetImportBridge, UploadStatus};
pub use mux::MuxClient;

use crate::error::MiraResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Upload status the host reports once an asset exists for the upload
pub const UPLOAD_ASSET_CREATED: &str = "asset_created";

/// Playback identifier of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackId {
    pub id: String,
    #[serde(default)]
    pub policy: Option<String>,
}

/// Host-side metadata attached to an asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMeta {
    #[serde(default)]
    pub title: Option<String>,
}

/// Remote asset as the host describes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Unix seconds, as a string
    #[serde(default)]
    pub created_at: Option<String>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
    /// Opaque payload attached when the upload was created
    #[serde(default)]
    pub passthrough: Option<String>,
    #[serde(default)]
    pub meta: Option<AssetMeta>,
}

impl RemoteAsset {
    pub fn playback_id(&self) -> Option<&str> {
        self.playback_ids.first().map(|p| p.id.as_str())
    }
}

/// One-time direct upload URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub id: String,
    pub url: String,
}

/// Direct upload as the host describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUpload {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub asset_id: Option<String>,
}

/// Remote asset store
#[async_trait]
pub trait VideoHost: Send + Sync {
    /// All assets held by the host
    async fn list_assets(&self) -> MiraResult<Vec<RemoteAsset>>;

    async fn get_asset(&self, asset_id: &str) -> MiraResult<RemoteAsset>;

    async fn delete_asset(&self, asset_id: &str) -> MiraResult<()>;

    /// Ask for a one-time upload URL; `passthrough` is echoed back on the asset
    async fn create_upload(&self, passthrough: &str) -> MiraResult<UploadTicket>;

    async fn get_upload(&self, upload_id: &str) -> MiraResult<RemoteUpload>;
}

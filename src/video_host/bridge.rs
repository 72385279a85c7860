/// Correlates remote assets with stored films and drives direct uploads
use super::{RemoteAsset, UploadTicket, VideoHost, UPLOAD_ASSET_CREATED};
use crate::{
    account::ValidatedSession,
    auth::require_admin,
    catalog::FilmManager,
    error::{MiraError, MiraResult},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

/// Title used when an upload is started without one
pub const DEFAULT_UPLOAD_TITLE: &str = "Untitled Film";

/// Remote asset annotated for the admin import view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedAsset {
    pub id: String,
    pub playback_id: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_imported: bool,
}

/// Normalized upload status.
///
/// `completed` once the host has produced an asset; otherwise the host's
/// own status string, unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl UploadStatus {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Display title of an asset: the upload payload's `title`, then the host's
/// metadata title. A payload that is not a JSON object is ignored.
pub fn resolve_title(asset: &RemoteAsset) -> Option<String> {
    let from_passthrough = asset
        .passthrough
        .as_deref()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .and_then(|value| value.get("title").and_then(|t| t.as_str()).map(String::from));

    from_passthrough.or_else(|| asset.meta.as_ref().and_then(|m| m.title.clone()))
}

/// Mark each remote asset whose id is attached to a stored film
pub fn annotate(assets: Vec<RemoteAsset>, imported: &HashSet<String>) -> Vec<AnnotatedAsset> {
    assets
        .into_iter()
        .map(|asset| AnnotatedAsset {
            title: resolve_title(&asset),
            playback_id: asset.playback_id().map(String::from),
            is_imported: imported.contains(&asset.id),
            id: asset.id,
            status: asset.status,
            created_at: asset.created_at,
            duration: asset.duration,
        })
        .collect()
}

/// Admin-only bridge between the film library and the video host
#[derive(Clone)]
pub struct AssetImportBridge {
    host: Option<Arc<dyn VideoHost>>,
    films: FilmManager,
}

impl AssetImportBridge {
    pub fn new(host: Option<Arc<dyn VideoHost>>, films: FilmManager) -> Self {
        Self { host, films }
    }

    fn host(&self) -> MiraResult<&Arc<dyn VideoHost>> {
        self.host
            .as_ref()
            .ok_or_else(|| MiraError::Internal("Video host is not configured".to_string()))
    }

    /// Every remote asset, flagged when a film already references it
    pub async fn list_assets(&self, session: &ValidatedSession) -> MiraResult<Vec<AnnotatedAsset>> {
        require_admin(session)?;

        let host = self.host()?;
        let (assets, imported) =
            futures::try_join!(host.list_assets(), self.films.imported_asset_ids())?;
        let imported: HashSet<String> = imported.into_iter().collect();

        Ok(annotate(assets, &imported))
    }

    pub async fn delete_asset(
        &self,
        session: &ValidatedSession,
        asset_id: Option<&str>,
    ) -> MiraResult<()> {
        require_admin(session)?;

        let asset_id = asset_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MiraError::Validation("Asset ID is required".to_string()))?;

        self.host()?.delete_asset(asset_id).await
    }

    /// One-time upload URL; the title rides along as the asset's passthrough
    pub async fn issue_upload(
        &self,
        session: &ValidatedSession,
        title: Option<&str>,
    ) -> MiraResult<UploadTicket> {
        require_admin(session)?;

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_TITLE);
        let passthrough = json!({ "title": title, "type": "film" }).to_string();

        let ticket = self.host()?.create_upload(&passthrough).await?;
        tracing::info!(upload_id = %ticket.id, title = %title, "issued upload ticket");

        Ok(ticket)
    }

    pub async fn poll_upload(
        &self,
        session: &ValidatedSession,
        upload_id: &str,
    ) -> MiraResult<UploadStatus> {
        require_admin(session)?;

        let host = self.host()?;
        let upload = host.get_upload(upload_id).await?;

        match upload.asset_id {
            Some(asset_id) if upload.status == UPLOAD_ASSET_CREATED => {
                let asset = host.get_asset(&asset_id).await?;
                Ok(UploadStatus {
                    status: "completed".to_string(),
                    playback_id: asset.playback_id().map(String::from),
                    asset_id: Some(asset.id),
                    duration: asset.duration,
                })
            }
            _ => Ok(UploadStatus {
                status: upload.status,
                asset_id: None,
                playback_id: None,
                duration: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_host::{AssetMeta, PlaybackId};

    fn asset(id: &str) -> RemoteAsset {
        RemoteAsset {
            id: id.to_string(),
            status: Some("ready".to_string()),
            playback_ids: vec![PlaybackId {
                id: format!("pb-{}", id),
                policy: Some("public".to_string()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_title_from_passthrough() {
        let mut a = asset("a");
        a.passthrough = Some(r#"{"title":"Neon Dreams","type":"film"}"#.to_string());
        a.meta = Some(AssetMeta {
            title: Some("ignored".to_string()),
        });
        assert_eq!(resolve_title(&a).as_deref(), Some("Neon Dreams"));
    }

    #[test]
    fn test_title_falls_back_to_meta() {
        let mut a = asset("a");
        a.passthrough = Some("not json".to_string());
        a.meta = Some(AssetMeta {
            title: Some("From Host".to_string()),
        });
        assert_eq!(resolve_title(&a).as_deref(), Some("From Host"));
    }

    #[test]
    fn test_unparsable_passthrough_without_meta_has_no_title() {
        let mut a = asset("a");
        a.passthrough = Some("{broken".to_string());
        assert_eq!(resolve_title(&a), None);
    }

    #[test]
    fn test_annotate_marks_exactly_imported() {
        let imported: HashSet<String> = ["b".to_string()].into_iter().collect();
        let annotated = annotate(vec![asset("a"), asset("b"), asset("c")], &imported);

        let flags: Vec<(&str, bool)> = annotated
            .iter()
            .map(|a| (a.id.as_str(), a.is_imported))
            .collect();
        assert_eq!(flags, vec![("a", false), ("b", true), ("c", false)]);
        assert_eq!(annotated[1].playback_id.as_deref(), Some("pb-b"));
    }
}

/// Mux Video API client
use super::{RemoteAsset, RemoteUpload, UploadTicket, VideoHost};
use crate::{
    config::VideoHostConfig,
    error::{MiraError, MiraResult},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

/// Mux wraps every payload in `{"data": ...}`
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct CreatedUpload {
    id: String,
    url: String,
}

/// HTTP client for the Mux video API
#[derive(Clone)]
pub struct MuxClient {
    http_client: reqwest::Client,
    config: VideoHostConfig,
}

impl MuxClient {
    pub fn new(config: VideoHostConfig) -> MiraResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("mira/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| MiraError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .basic_auth(&self.config.token_id, Some(&self.config.token_secret))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> MiraResult<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MiraError::VideoHost(format!(
                "Mux returned {}: {}",
                status, body
            )));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| MiraError::VideoHost(format!("Invalid Mux response: {}", e)))?;

        Ok(envelope.data)
    }
}

#[async_trait]
impl VideoHost for MuxClient {
    async fn list_assets(&self) -> MiraResult<Vec<RemoteAsset>> {
        self.send(self.request(reqwest::Method::GET, "/video/v1/assets"))
            .await
    }

    async fn get_asset(&self, asset_id: &str) -> MiraResult<RemoteAsset> {
        self.send(self.request(reqwest::Method::GET, &format!("/video/v1/assets/{}", asset_id)))
            .await
    }

    async fn delete_asset(&self, asset_id: &str) -> MiraResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/video/v1/assets/{}", asset_id))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MiraError::VideoHost(format!(
                "Mux refused to delete asset {}: {}",
                asset_id,
                response.status()
            )));
        }

        tracing::info!(asset_id = %asset_id, "deleted remote asset");
        Ok(())
    }

    async fn create_upload(&self, passthrough: &str) -> MiraResult<UploadTicket> {
        let body = json!({
            "cors_origin": self.config.upload_cors_origin,
            "new_asset_settings": {
                "playback_policy": ["public"],
                "passthrough": passthrough,
            },
        });

        let created: CreatedUpload = self
            .send(self.request(reqwest::Method::POST, "/video/v1/uploads").json(&body))
            .await?;

        Ok(UploadTicket {
            id: created.id,
            url: created.url,
        })
    }

    async fn get_upload(&self, upload_id: &str) -> MiraResult<RemoteUpload> {
        self.send(self.request(reqwest::Method::GET, &format!("/video/v1/uploads/{}", upload_id)))
            .await
    }
}

use std::time::Duration;

use ezd_logging::{ezd_debug, ezd_error};
use ezdiffusion_core::{GenerationParameters, HistoryEntry};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::wire::{GenerateRequest, WireGenerationResponse, WireHistoryResponse, WireParams};
use crate::{ApiError, GenerationAccepted, MemoryInfo, Transport};

pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:8000";
pub const PRODUCTION_BASE_URL: &str = "https://api.ezdiffusion.app";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        let base_url = if cfg!(debug_assertions) {
            DEVELOPMENT_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Self {
            base_url: base_url.to_string(),
            connect_timeout: Duration::from_secs(10),
            // Generation holds the connection open until the image is done.
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[async_trait::async_trait]
pub trait DiffusionApi: Send + Sync {
    async fn submit_generation(
        &self,
        params: &GenerationParameters,
    ) -> Result<GenerationAccepted, ApiError>;

    async fn fetch_history(
        &self,
        offset: usize,
        length: usize,
    ) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn fetch_memory_info(&self) -> Result<MemoryInfo, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDiffusionApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestDiffusionApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(format!("failed to build http client: {err}")))?;
        Ok(Self { settings, client })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|err| ApiError::new(format!("invalid url {base}{path}: {err}")))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|err| {
            ezd_error!("Error in {}: {}", operation, err);
            map_reqwest_error(err)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            ezd_error!("Error in {}: http status {} body_len={}", operation, status, body.len());
            let detail = if body.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {body}")
            };
            return Err(ApiError::new(format!("server returned {detail}")));
        }

        response.json::<T>().await.map_err(|err| {
            ezd_error!("Error in {}: malformed payload: {}", operation, err);
            ApiError::new(format!("malformed response: {err}"))
        })
    }
}

#[async_trait::async_trait]
impl DiffusionApi for ReqwestDiffusionApi {
    async fn submit_generation(
        &self,
        params: &GenerationParameters,
    ) -> Result<GenerationAccepted, ApiError> {
        let transport = Transport::for_mode(&params.mode);
        let url = self.endpoint(transport.path())?;
        ezd_debug!("Submitting {:?} to {}", transport, url);

        let body = GenerateRequest {
            input: WireParams::from(params),
        };
        let response: WireGenerationResponse = self
            .read_json("generation submit", self.client.post(url).json(&body))
            .await?;
        Ok(response.into())
    }

    async fn fetch_history(
        &self,
        offset: usize,
        length: usize,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let mut url = self.endpoint("/v1/history")?;
        url.query_pairs_mut()
            .append_pair("index", &offset.to_string())
            .append_pair("length", &length.to_string());
        let response: WireHistoryResponse = self
            .read_json("history fetch", self.client.get(url))
            .await?;
        Ok(response.results.into_iter().map(Into::into).collect())
    }

    async fn fetch_memory_info(&self) -> Result<MemoryInfo, ApiError> {
        let url = self.endpoint("/v1/system/memory")?;
        let value: Value = self.read_json("memory info", self.client.get(url)).await?;
        MemoryInfo::try_from(value)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(format!("request timed out: {err}"));
    }
    if err.is_connect() {
        return ApiError::new(format!("could not reach server: {err}"));
    }
    ApiError::new(format!("network error: {err}"))
}

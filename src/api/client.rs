// ABOUTME: reqwest-based client for the server's JSON tool endpoints
// Every call is a POST of {category_idx, tool_idx}; HTTP status codes are not inspected

use crate::api::error::ApiError;
use crate::api::types::{InstallResponse, RunInteractiveResponse, ToolInfoResponse, ToolRequest};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

const INSTALL_PATH: &str = "api/tool/install";
const RUN_INTERACTIVE_PATH: &str = "api/tool/run-interactive";
const INFO_PATH: &str = "api/tool/info";

#[derive(Debug, Clone)]
pub struct ToolApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ToolApiClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(server_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn install(&self, request: ToolRequest) -> Result<InstallResponse, ApiError> {
        info!(
            "Requesting install of tool {}/{}",
            request.category_idx, request.tool_idx
        );
        self.post(INSTALL_PATH, request).await
    }

    pub async fn run_interactive(
        &self,
        request: ToolRequest,
    ) -> Result<RunInteractiveResponse, ApiError> {
        info!(
            "Requesting interactive run of tool {}/{}",
            request.category_idx, request.tool_idx
        );
        self.post(RUN_INTERACTIVE_PATH, request).await
    }

    pub async fn tool_info(&self, request: ToolRequest) -> Result<ToolInfoResponse, ApiError> {
        self.post(INFO_PATH, request).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, request: ToolRequest) -> Result<T, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidBaseUrl(self.base_url.to_string(), e.to_string()))?;
        debug!("POST {}", url);

        let response = self.http.post(url).json(&request).send().await?;
        let body = response.json::<T>().await?;
        Ok(body)
    }
}

/// Parse the server URL so relative endpoint paths join beneath it
pub fn parse_base_url(server_url: &str) -> Result<Url, ApiError> {
    let mut raw = server_url.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw).map_err(|e| ApiError::InvalidBaseUrl(server_url.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidBaseUrl(
            server_url.to_string(),
            format!("unsupported scheme {other}"),
        )),
    }
}

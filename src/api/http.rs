//! HTTP backend over `reqwest`.
//!
//! No request timeout is configured: the backend's own behavior bounds
//! latency. Only the TCP connect phase is bounded.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::QueryBackend;
use super::curl::{EXECUTE_PATH, execute_command};
use super::types::{
    ApiError, DEFAULT_EXECUTE_ERROR, ErrorDetail, ExecuteRequest, ExecuteResponse, Schema, TablesResponse,
    parse_schema_response,
};
use crate::config::ClientConfig;

const SCHEMA_PATH: &str = "/api/schema";
const TABLES_PATH: &str = "/api/tables";

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend client from config.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    async fn get_text(&self, path: &str, fallback: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "http: GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_body(response, fallback).await
    }

    async fn post_text(&self, path: &str, body: &impl Serialize, fallback: &str) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "http: POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_body(response, fallback).await
    }
}

async fn read_body(response: reqwest::Response, fallback: &str) -> Result<String, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    if !status.is_success() {
        return Err(ApiError::Http { status: status.as_u16(), detail: ErrorDetail::text_from_body(&text, fallback) });
    }
    Ok(text)
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[async_trait::async_trait]
impl QueryBackend for HttpBackend {
    async fn fetch_schema(&self) -> Result<Schema, ApiError> {
        let text = self.get_text(SCHEMA_PATH, "Failed to fetch schema").await?;
        parse_schema_response(&text)
    }

    async fn fetch_tables(&self) -> Result<Vec<String>, ApiError> {
        let text = self.get_text(TABLES_PATH, "Failed to fetch tables").await?;
        let tables: TablesResponse = parse_json(&text)?;
        Ok(tables.table_list)
    }

    async fn execute(&self, query: &str) -> Result<ExecuteResponse, ApiError> {
        let body = ExecuteRequest { query: query.to_string() };
        let text = self.post_text(EXECUTE_PATH, &body, DEFAULT_EXECUTE_ERROR).await?;
        parse_json(&text)
    }

    fn curl_for(&self, query: &str) -> Option<String> {
        Some(execute_command(&self.base_url, query))
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

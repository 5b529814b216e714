// src/api/client.rs
//! Pure HTTP client wrapper for the Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication, basic
//! request/response operations, and transient-failure retry — parsing
//! and business logic live elsewhere.

use crate::constants::{
    TRANSPORT_RETRY_ATTEMPTS, TRANSPORT_RETRY_INITIAL_DELAY_MS, TRANSPORT_RETRY_MAX_DELAY_MS,
};
use crate::error::AppError;
use crate::error_recovery::retry_with_backoff;
use crate::types::ApiKey;
use reqwest::{header, Client, Response};
use serde::Serialize;
use std::time::Duration;

const NOTION_VERSION: &str = "2022-06-28";
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self { client })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(response)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Ok(response)
    }

    /// Runs a wire call under the transport retry policy.
    ///
    /// Retries cover rate limiting and transient server faults only;
    /// not-found and auth errors surface on the first attempt.
    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, AppError>>,
    {
        retry_with_backoff(
            operation,
            TRANSPORT_RETRY_ATTEMPTS,
            Duration::from_millis(TRANSPORT_RETRY_INITIAL_DELAY_MS),
            Duration::from_millis(TRANSPORT_RETRY_MAX_DELAY_MS),
        )
        .await
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &crate::types::NotionId) -> Result<crate::model::Page, AppError> {
        let endpoint = format!("pages/{}", id.to_hyphenated());
        self.with_retry(|| async {
            let response = self.get(&endpoint).await?;
            let result = extract_response_text(response).await?;
            super::parser::parse_page_response(result)
        })
        .await
    }

    async fn retrieve_database(
        &self,
        id: &crate::types::NotionId,
    ) -> Result<crate::model::Database, AppError> {
        let endpoint = format!("databases/{}", id.to_hyphenated());
        self.with_retry(|| async {
            let response = self.get(&endpoint).await?;
            let result = extract_response_text(response).await?;
            super::parser::parse_database_response(result)
        })
        .await
    }

    async fn retrieve_block_children(
        &self,
        parent: &crate::types::NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<super::pagination::PaginatedResponse<crate::model::Block>, AppError> {
        let mut endpoint = format!(
            "blocks/{}/children?page_size={}",
            parent.to_hyphenated(),
            page_size
        );
        if let Some(cursor) = &cursor {
            endpoint.push_str(&format!("&start_cursor={}", cursor));
        }
        self.with_retry(|| async {
            let response = self.get(&endpoint).await?;
            let result = extract_response_text(response).await?;
            super::parser::parse_blocks_page(result)
        })
        .await
    }

    async fn query_database(
        &self,
        database: &crate::types::NotionId,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<super::pagination::PaginatedResponse<crate::types::NotionId>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_hyphenated());
        let mut body = serde_json::json!({ "page_size": page_size });
        if let Some(cursor) = &cursor {
            body["start_cursor"] = serde_json::json!(cursor);
        }
        self.with_retry(|| async {
            let response = self.post(&endpoint, &body).await?;
            let result = extract_response_text(response).await?;
            super::parser::parse_query_page(result)
        })
        .await
    }

    async fn search(
        &self,
        page_size: u32,
        cursor: Option<String>,
    ) -> Result<super::pagination::PaginatedResponse<crate::model::ResourceRef>, AppError> {
        let mut body = serde_json::json!({ "page_size": page_size });
        if let Some(cursor) = &cursor {
            body["start_cursor"] = serde_json::json!(cursor);
        }
        self.with_retry(|| async {
            let response = self.post("search", &body).await?;
            let result = extract_response_text(response).await?;
            super::parser::parse_search_page(result)
        })
        .await
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

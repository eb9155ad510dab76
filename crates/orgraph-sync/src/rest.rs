use crate::backend::{Backend, collection_path};
use crate::BackendError;
use async_trait::async_trait;
use orgraph_api::{ApiError, ListQuery, Record};
use orgraph_core::{RecordKind, RecordRef};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-over-HTTP client for the console backend.
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: RecordKind) -> String {
        format!("{}{}", self.base_url, collection_path(kind))
    }

    fn record_url(&self, target: RecordRef) -> String {
        format!("{}/{}", self.collection_url(target.kind), target.id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Backend returned {}: {}", status, body);
        Err(BackendError::Status {
            status: status.as_u16(),
            error: ApiError::from_body(status.as_u16(), &body),
        })
    }

    async fn read_record(&self, kind: RecordKind, response: reqwest::Response) -> Result<Record, BackendError> {
        let value: Value = response.json().await?;
        Record::from_json(kind, value).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn list(&self, kind: RecordKind, query: &ListQuery) -> Result<Vec<Record>, BackendError> {
        let request = self
            .client
            .get(self.collection_url(kind))
            .query(&query.to_pairs());
        let response = self.send(request).await?;
        let values: Vec<Value> = response.json().await?;

        let mut records = Vec::with_capacity(values.len());
        for value in values {
            match Record::from_json(kind, value) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping malformed {} record: {}", kind.as_str(), e),
            }
        }
        tracing::debug!("Fetched {} {} records", records.len(), kind.as_str());
        Ok(records)
    }

    async fn get(&self, target: RecordRef) -> Result<Record, BackendError> {
        let response = self.send(self.client.get(self.record_url(target))).await?;
        self.read_record(target.kind, response).await
    }

    async fn create(&self, record: Record) -> Result<Record, BackendError> {
        let kind = record.kind();
        let request = self.client.post(self.collection_url(kind)).json(&record);
        let response = self.send(request).await?;
        self.read_record(kind, response).await
    }

    async fn update(&self, target: RecordRef, record: Record) -> Result<Record, BackendError> {
        let request = self.client.put(self.record_url(target)).json(&record);
        let response = self.send(request).await?;
        self.read_record(target.kind, response).await
    }

    async fn delete(&self, target: RecordRef) -> Result<(), BackendError> {
        self.send(self.client.delete(self.record_url(target))).await?;
        Ok(())
    }
}

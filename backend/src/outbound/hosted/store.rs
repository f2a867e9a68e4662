//! PostgREST data-store adapter.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use zeroize::Zeroizing;

use super::query::{delete_url, rpc_url, select_url, table_url};
use super::{HostedBackend, hosted_error_message, status_message};
use crate::domain::ports::{
    DataStore, DataStoreFactory, EqFilter, Row, SelectQuery, StoreCredentials, StoreError,
};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Opens [`RestDataStore`] handles bound to explicit credentials.
#[derive(Clone)]
pub struct RestDataStoreFactory {
    backend: HostedBackend,
}

impl RestDataStoreFactory {
    /// Wrap a configured backend.
    pub fn new(backend: HostedBackend) -> Self {
        Self { backend }
    }
}

impl DataStoreFactory for RestDataStoreFactory {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn DataStore>, StoreError> {
        let (api_key, bearer) = match credentials {
            StoreCredentials::Anonymous => {
                (self.backend.anon_key.clone(), self.backend.anon_key.clone())
            }
            StoreCredentials::User(token) => (
                self.backend.anon_key.clone(),
                Arc::new(Zeroizing::new(token.expose().to_owned())),
            ),
            StoreCredentials::ServiceRole => {
                let key = self.backend.service_role_key.clone().ok_or_else(|| {
                    StoreError::unconfigured("service-role key is required for elevated access")
                })?;
                (key.clone(), key)
            }
        };
        Ok(Arc::new(RestDataStore {
            backend: self.backend.clone(),
            api_key,
            bearer,
        }))
    }
}

/// Request-scoped PostgREST handle.
pub struct RestDataStore {
    backend: HostedBackend,
    api_key: Arc<Zeroizing<String>>,
    bearer: Arc<Zeroizing<String>>,
}

impl RestDataStore {
    fn authorised(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.bearer.as_str()))
            .map_err(|_| StoreError::invalid_request("access token is not a valid header value"))?;
        auth.set_sensitive(true);
        let mut api_key = HeaderValue::from_str(self.api_key.as_str())
            .map_err(|_| StoreError::invalid_request("API key is not a valid header value"))?;
        api_key.set_sensitive(true);
        Ok(request
            .header("apikey", api_key)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json"))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, StoreError> {
        let response = self
            .authorised(request)?
            .send()
            .await
            .map_err(map_transport_error)?;
        read_body(response).await
    }
}

async fn read_body(response: Response) -> Result<Vec<u8>, StoreError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

fn map_transport_error(error: reqwest::Error) -> StoreError {
    StoreError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> StoreError {
    match hosted_error_message(body) {
        Some(message) => StoreError::backend(message),
        None if status.is_server_error() => StoreError::transport(status_message(status, body)),
        None => StoreError::backend(status_message(status, body)),
    }
}

fn parse_rows(body: &[u8]) -> Result<Vec<Row>, StoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body)
        .map_err(|err| StoreError::decode(format!("expected a JSON array of rows: {err}")))
}

#[async_trait]
impl DataStore for RestDataStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let url = select_url(&self.backend.base_url, query)?;
        let body = self.send(self.backend.client.get(url)).await?;
        parse_rows(&body)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let url = table_url(&self.backend.base_url, table)?;
        let request = self
            .backend
            .client
            .post(url)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&row);
        let body = self.send(request).await?;
        parse_rows(&body)
    }

    async fn delete(&self, table: &str, filters: &[EqFilter]) -> Result<usize, StoreError> {
        let url = delete_url(&self.backend.base_url, table, filters)?;
        let request = self
            .backend
            .client
            .delete(url)
            .header("Prefer", PREFER_REPRESENTATION);
        let body = self.send(request).await?;
        Ok(parse_rows(&body)?.len())
    }

    async fn rpc(&self, name: &str, args: Value) -> Result<Value, StoreError> {
        let url = rpc_url(&self.backend.base_url, name)?;
        let body = self.send(self.backend.client.post(url).json(&args)).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body)
            .map_err(|err| StoreError::decode(format!("invalid RPC response: {err}")))
    }
}

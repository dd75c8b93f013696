//! HTTP client for the tenant/vendor record service.
//!
//! Wraps `reqwest` with the service's envelope handling: a 2xx HTTP status
//! is necessary but not sufficient, the JSON `statusCode` must also be 200.
//! List calls are retried on transient failures; mutations are sent once.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tenantdesk_core::{TenantRecord, VendorRecord};

use crate::error::RecordsError;
use crate::retry::retry_with_backoff;
use crate::types::{
    EditRequest, EditResponse, ListEnvelope, ListRequest, MutationResponse, TenantUpdate, VendorPayload,
    VendorUpdate, STATUS_OK,
};

pub const DEFAULT_BASE_URL: &str =
    "https://m2fa6mzwo4.execute-api.ca-central-1.amazonaws.com/multi_tenant/";

const LIST_PATH: &str = "tenantandvendor";
const CREATE_VENDOR_PATH: &str = "create_vendor";
const EDIT_PATH: &str = "edit_detail";

/// Connection and retry settings for [`RecordsClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "tenantdesk/0.1 (vendor-admin)".to_owned(),
            max_retries: 3,
            retry_backoff_base_ms: 500,
        }
    }
}

/// Client for the record service.
///
/// Use [`RecordsClient::new`] for production or
/// [`RecordsClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct RecordsClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl RecordsClient {
    /// # Errors
    ///
    /// Returns [`RecordsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(options: &ClientOptions) -> Result<Self, RecordsError> {
        Self::with_base_url(DEFAULT_BASE_URL, options)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RecordsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(base_url: &str, options: &ClientOptions) -> Result<Self, RecordsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash, so joining "create_vendor" appends to
        // the stage path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RecordsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: options.max_retries,
            retry_backoff_base_ms: options.retry_backoff_base_ms,
        })
    }

    /// Lists every tenant.
    ///
    /// # Errors
    ///
    /// - [`RecordsError::Api`] if the envelope is not `statusCode == 200`
    ///   with `body.data` present.
    /// - [`RecordsError::Http`] on network failure or non-2xx status, after
    ///   retries.
    /// - [`RecordsError::Deserialize`] if the body does not match.
    pub async fn list_tenants(&self) -> Result<Vec<TenantRecord>, RecordsError> {
        let request = ListRequest {
            kind: "tenant",
            tenant_id: None,
        };
        let tenants: Vec<TenantRecord> = self.list("list_tenants", &request).await?;
        tracing::debug!(count = tenants.len(), "tenants fetched");
        Ok(tenants)
    }

    /// Lists the vendors of one tenant.
    ///
    /// # Errors
    ///
    /// Same as [`RecordsClient::list_tenants`].
    pub async fn list_vendors(&self, tenant_id: &str) -> Result<Vec<VendorRecord>, RecordsError> {
        let request = ListRequest {
            kind: "vendor",
            tenant_id: Some(tenant_id),
        };
        let vendors: Vec<VendorRecord> = self.list("list_vendors", &request).await?;
        tracing::debug!(tenant_id, count = vendors.len(), "vendors fetched");
        Ok(vendors)
    }

    /// Creates a vendor. Never retried.
    ///
    /// # Errors
    ///
    /// - [`RecordsError::Http`] on network failure or non-2xx status.
    /// - [`RecordsError::Api`] when `statusCode != 200`, carrying the
    ///   service's message.
    /// - [`RecordsError::Deserialize`] if the body does not match.
    pub async fn create_vendor(
        &self,
        payload: &VendorPayload,
    ) -> Result<MutationResponse, RecordsError> {
        tracing::info!(
            tenant_id = %payload.tenant_id,
            vendor_name = %payload.vendor_name,
            "creating vendor"
        );
        self.mutate(CREATE_VENDOR_PATH, payload).await
    }

    /// Saves edits to an existing vendor. Never retried.
    ///
    /// Any 2xx reply is a success unless it carries a `statusCode` other
    /// than 200; an empty or non-JSON body is accepted.
    ///
    /// # Errors
    ///
    /// - [`RecordsError::Http`] on network failure or non-2xx status.
    /// - [`RecordsError::Api`] when a `statusCode` is present and not 200.
    pub async fn update_vendor(&self, update: &VendorUpdate) -> Result<EditResponse, RecordsError> {
        tracing::info!(vendor_id = %update.vendor_id, "updating vendor");
        let request = EditRequest {
            kind: "vendor",
            detail: update,
        };
        self.edit(&request).await
    }

    /// Saves edits to an existing tenant. Never retried.
    ///
    /// # Errors
    ///
    /// Same as [`RecordsClient::update_vendor`].
    pub async fn update_tenant(&self, update: &TenantUpdate) -> Result<EditResponse, RecordsError> {
        tracing::info!(tenant_id = %update.tenant_id, "updating tenant");
        let request = EditRequest {
            kind: "tenant",
            detail: update,
        };
        self.edit(&request).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, RecordsError> {
        self.base_url
            .join(path)
            .map_err(|e| RecordsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: &ListRequest<'_>,
    ) -> Result<Vec<T>, RecordsError> {
        let url = self.endpoint(LIST_PATH)?;
        let body = retry_with_backoff(
            operation,
            self.max_retries,
            self.retry_backoff_base_ms,
            || self.post_json(&url, request),
        )
        .await?;

        let envelope: ListEnvelope<T> =
            serde_json::from_value(body).map_err(|e| RecordsError::Deserialize {
                context: operation.to_owned(),
                source: e,
            })?;

        match envelope.body.and_then(|b| b.data) {
            Some(data) if envelope.status_code == STATUS_OK => Ok(data),
            _ => Err(RecordsError::Api {
                status_code: envelope.status_code,
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("invalid response format for {}", request.kind)),
            }),
        }
    }

    async fn mutate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<MutationResponse, RecordsError> {
        let url = self.endpoint(path)?;
        let body = self.post_json(&url, payload).await?;
        let response: MutationResponse =
            serde_json::from_value(body).map_err(|e| RecordsError::Deserialize {
                context: path.to_owned(),
                source: e,
            })?;

        if response.status_code != STATUS_OK {
            return Err(RecordsError::Api {
                status_code: response.status_code,
                message: response
                    .message
                    .unwrap_or_else(|| "Unknown error".to_owned()),
            });
        }
        Ok(response)
    }

    async fn edit<B: Serialize + ?Sized>(&self, payload: &B) -> Result<EditResponse, RecordsError> {
        let url = self.endpoint(EDIT_PATH)?;
        let body = self.post(&url, payload).await?;
        let response = match serde_json::from_str::<EditResponse>(&body) {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "edit_detail reply has no envelope; treating 2xx as success");
                EditResponse::default()
            }
        };

        match response.status_code {
            Some(code) if code != STATUS_OK => Err(RecordsError::Api {
                status_code: code,
                message: response
                    .message
                    .unwrap_or_else(|| "Unknown error".to_owned()),
            }),
            _ => Ok(response),
        }
    }

    /// Sends a JSON POST, asserts a 2xx HTTP status, and returns the body.
    async fn post<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        payload: &B,
    ) -> Result<String, RecordsError> {
        let response = self.client.post(url.clone()).json(payload).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Like [`Self::post`], parsing the response body as JSON.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        payload: &B,
    ) -> Result<serde_json::Value, RecordsError> {
        let body = self.post(url, payload).await?;
        serde_json::from_str(&body).map_err(|e| RecordsError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

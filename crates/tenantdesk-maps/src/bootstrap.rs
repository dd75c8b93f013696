//! Production [`MapPlatform`]: fetches the provider's bootstrap script.
//!
//! A 2xx response means the credential is accepted for this origin and the
//! capability is usable. Each successful load gets its own
//! [`HeadlessRuntime`].

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};

use crate::error::LoadError;
use crate::geocode::DEFAULT_BASE_URL;
use crate::headless::HeadlessRuntime;
use crate::platform::{LoadRequest, MapHandle, MapPlatform};

const SCRIPT_PATH: &str = "maps/api/js";

#[derive(Debug, Clone)]
pub struct BootstrapPlatform {
    client: Client,
    base_url: Url,
}

impl BootstrapPlatform {
    /// # Errors
    ///
    /// Returns [`LoadError::Unknown`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, LoadError> {
        Self::with_base_url(timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`LoadError::Unknown`] if the HTTP client cannot be built or
    /// `base_url` does not parse.
    pub fn with_base_url(
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()
            .map_err(|e| LoadError::Unknown(format!("failed to build HTTP client: {e}")))?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| LoadError::Unknown(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    fn script_url(&self, request: &LoadRequest) -> Result<Url, LoadError> {
        let mut url = self
            .base_url
            .join(SCRIPT_PATH)
            .map_err(|e| LoadError::Unknown(format!("invalid script URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", request.credential.expose())
            .append_pair("v", request.version)
            .append_pair("libraries", &request.capabilities.join(","));
        Ok(url)
    }

    async fn fetch(client: Client, url: Url, request: LoadRequest) -> Result<MapHandle, LoadError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::classify(&e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::from_response(status.as_u16(), &body));
        }

        tracing::debug!(
            credential = %request.credential,
            version = request.version,
            "map bootstrap accepted"
        );
        Ok(MapHandle::new(
            request.credential,
            Arc::new(HeadlessRuntime::new()),
        ))
    }
}

impl MapPlatform for BootstrapPlatform {
    fn load(&self, request: LoadRequest) -> BoxFuture<'static, Result<MapHandle, LoadError>> {
        let client = self.client.clone();
        match self.script_url(&request) {
            Ok(url) => Self::fetch(client, url, request).boxed(),
            Err(e) => futures::future::ready(Err(e)).boxed(),
        }
    }
}

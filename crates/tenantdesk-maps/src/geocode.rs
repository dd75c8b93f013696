//! Reverse geocoding: coordinate to a human-readable address.
//!
//! [`GeocodingClient`] talks to the provider and reports every failure.
//! [`GeocodeResolver`] wraps any [`ReverseGeocoder`] and never fails: when
//! the provider cannot answer, the address is the fixed-precision rendering
//! of the coordinate.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, Url};
use serde::Deserialize;
use tenantdesk_core::Coordinate;

use crate::credential::Credential;
use crate::error::GeocodeError;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";

const GEOCODE_PATH: &str = "maps/api/geocode/json";

/// Anything that can turn a coordinate into an address.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<String, GeocodeError>>;
}

/// Address used whenever the provider cannot produce one.
#[must_use]
pub fn fallback_address(coordinate: Coordinate) -> String {
    coordinate.to_fixed_string()
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

/// Client for the provider's reverse-geocoding REST endpoint.
pub struct GeocodingClient {
    client: Client,
    base_url: Url,
    credential: Credential,
}

impl GeocodingClient {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        credential: Credential,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GeocodeError> {
        Self::with_base_url(credential, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        credential: Credential,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    /// Looks up the first formatted address for `coordinate`.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or non-2xx status. The
    ///   request URL is stripped from the error so the key is never logged.
    /// - [`GeocodeError::Status`] when the provider status is not `OK`.
    /// - [`GeocodeError::NoResults`] when `OK` comes back with no results.
    /// - [`GeocodeError::Deserialize`] when the body is not the expected JSON.
    pub async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let url = self.build_url(coordinate)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| GeocodeError::Http(e.without_url()))?;
        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))?;

        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse_geocode({coordinate})"),
                source: e,
            })?;

        if parsed.status != "OK" {
            return Err(GeocodeError::Status {
                status: parsed.status,
                message: parsed.error_message,
            });
        }
        parsed
            .results
            .into_iter()
            .next()
            .map(|r| r.formatted_address)
            .ok_or(GeocodeError::NoResults)
    }

    fn build_url(&self, coordinate: Coordinate) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(GEOCODE_PATH)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair(
                "latlng",
                &format!("{},{}", coordinate.latitude, coordinate.longitude),
            )
            .append_pair("key", self.credential.expose());
        Ok(url)
    }
}

impl ReverseGeocoder for GeocodingClient {
    fn reverse(&self, coordinate: Coordinate) -> BoxFuture<'_, Result<String, GeocodeError>> {
        self.reverse_geocode(coordinate).boxed()
    }
}

/// Infallible address lookup.
#[derive(Clone)]
pub struct GeocodeResolver {
    provider: Arc<dyn ReverseGeocoder>,
}

impl GeocodeResolver {
    #[must_use]
    pub fn new(provider: Arc<dyn ReverseGeocoder>) -> Self {
        Self { provider }
    }

    pub async fn resolve(&self, coordinate: Coordinate) -> String {
        match self.provider.reverse(coordinate).await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(
                    %coordinate,
                    error = %e,
                    "reverse geocoding failed; using coordinate fallback"
                );
                fallback_address(coordinate)
            }
        }
    }
}

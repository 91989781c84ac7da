use std::time::Duration;

use geoinsight_core::ProviderError;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

const MAX_ERROR_BODY_CHARS: usize = 512;

pub(crate) fn build_client(
    provider: &'static str,
    timeout_secs: u64,
) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|error| request_error(provider, error))
}

pub(crate) fn request_error(provider: &'static str, error: reqwest::Error) -> ProviderError {
    ProviderError::Request { provider, message: error.to_string() }
}

/// Fails on non-2xx responses, otherwise decodes the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Response,
) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::UnexpectedStatus {
            provider,
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|error| ProviderError::Decode { provider, message: error.to_string() })
}

pub(crate) fn trim_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

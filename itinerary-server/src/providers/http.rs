//! Shared request/decode step for provider clients.

use serde::de::DeserializeOwned;

use super::error::ProviderError;

/// Send a request and decode a JSON body, mapping non-success statuses and
/// undecodable bodies to [`ProviderError`].
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        });
    }

    let body = response.text().await?;

    serde_json::from_str(&body).map_err(|e| ProviderError::Json {
        message: e.to_string(),
    })
}

/// Turn a Google `status` field into an error unless it is `OK`.
pub(crate) fn check_google_status(
    provider: &'static str,
    status: &str,
    message: Option<String>,
) -> Result<(), ProviderError> {
    if status == "OK" {
        Ok(())
    } else {
        Err(ProviderError::Status {
            provider,
            status: status.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_status_passes() {
        assert!(check_google_status("places", "OK", None).is_ok());
    }

    #[test]
    fn zero_results_is_a_failure() {
        let err = check_google_status("geocoding", "ZERO_RESULTS", None).unwrap_err();
        assert!(matches!(err, ProviderError::Status { ref status, .. } if status == "ZERO_RESULTS"));
    }
}

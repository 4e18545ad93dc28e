//! HTTP error mapping shared by the REST-based providers.

use advisor_core::AgentError;
use reqwest::StatusCode;

/// Map a transport failure onto the retry taxonomy
pub(crate) fn transport_error(err: &reqwest::Error, timeout_ms: u64) -> AgentError {
    if err.is_timeout() {
        AgentError::Timeout(timeout_ms)
    } else if err.is_connect() {
        AgentError::ProviderUnavailable(err.to_string())
    } else if err.is_decode() {
        AgentError::Parse(err.to_string())
    } else {
        AgentError::Provider(err.to_string())
    }
}

/// Map a non-success status; 5xx and 429 stay retryable, other 4xx do not
pub(crate) fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{status}: {}", body.chars().take(300).collect::<String>());
    match status {
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "invalid key"),
            AgentError::Auth(_)
        ));
        assert!(!status_error(StatusCode::BAD_REQUEST, "bad model").is_retryable());
    }

    #[test]
    fn test_status_detail_is_truncated() {
        let body = "x".repeat(1000);
        let err = status_error(StatusCode::BAD_REQUEST, &body);
        assert!(err.to_string().len() < 400);
    }
}

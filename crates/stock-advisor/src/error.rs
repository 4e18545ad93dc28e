//! Error Types for Stock Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Ticker not found for {0}")]
    TickerNotFound(String),

    #[error("{0}")]
    InsufficientData(String),

    #[error("{0}")]
    MissingSlot(String),

    #[error("Unsupported intent")]
    UnsupportedIntent(String),

    #[error("Unsupported commodity: {0}")]
    UnsupportedCommodity(String),

    #[error("Market data error: {0}")]
    Provider(String),
}

impl AdvisorError {
    /// Message safe to show an end user; provider details stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(_) => "Market data is temporarily unavailable. Please try again.".into(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_messages_are_verbatim() {
        assert_eq!(
            AdvisorError::UnsupportedIntent("crypto_airdrop".into()).to_string(),
            "Unsupported intent"
        );
        assert_eq!(
            AdvisorError::TickerNotFound("Acme Widgets".into()).user_message(),
            "Ticker not found for Acme Widgets"
        );
    }

    #[test]
    fn test_provider_details_are_hidden() {
        let err = AdvisorError::Provider("socket reset by 10.0.0.3".into());
        assert!(!err.user_message().contains("10.0.0.3"));
    }
}

//! Error type shared by providers and the aggregation pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The provider could not be reached at all.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A response or record is missing data the pipeline cannot estimate.
    #[error("invalid data: {message}")]
    Validation { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ForecastError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Missing-field shorthand used when normalizing provider payloads.
    pub fn missing(field: &str, context: &str) -> Self {
        Self::validation(format!("{context} is missing field `{field}`"))
    }

    /// Single human-readable line for the retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Transport { .. } => {
                "Unable to reach the weather service. Please check your connection.".to_string()
            }
            ForecastError::Status { status: 401, .. } => {
                "The weather service rejected the API key. Run `energy configure`.".to_string()
            }
            ForecastError::Status { endpoint, status, .. } => {
                format!("The weather service returned an error ({status}) for {endpoint}.")
            }
            ForecastError::Decode { .. } | ForecastError::Validation { .. } => {
                "The weather service returned data that could not be understood.".to_string()
            }
            ForecastError::Config { message } => message.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_field_and_context() {
        let err = ForecastError::missing("clouds", "forecast entry 3");
        assert!(matches!(err, ForecastError::Validation { .. }));
        assert_eq!(
            err.to_string(),
            "invalid data: forecast entry 3 is missing field `clouds`"
        );
    }

    #[test]
    fn status_401_points_at_configure() {
        let err = ForecastError::Status {
            endpoint: "current weather",
            status: 401,
            body: "Invalid API key".into(),
        };
        assert!(err.user_message().contains("energy configure"));
    }

    #[test]
    fn other_status_mentions_code() {
        let err = ForecastError::Status {
            endpoint: "forecast",
            status: 502,
            body: String::new(),
        };
        let msg = err.user_message();
        assert!(msg.contains("502"));
        assert!(msg.contains("forecast"));
    }

    #[test]
    fn config_message_is_passed_through() {
        let err = ForecastError::config("No API key configured.");
        assert_eq!(err.user_message(), "No API key configured.");
    }
}

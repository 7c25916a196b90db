use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactCheckError {
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Stream stalled: no data received for {0} seconds")]
    Timeout(u64),

    #[error("Recursion limit of {0} reached without a final answer")]
    RecursionLimit(usize),
}

impl FactCheckError {
    /// Build an API error from a non-success HTTP response, consuming its body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        FactCheckError::ApiError { status, message }
    }
}

pub type Result<T> = std::result::Result<T, FactCheckError>;

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn from_response_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let response = reqwest::get(server.uri()).await.unwrap();
        let err = FactCheckError::from_response(response).await;

        assert!(matches!(
            &err,
            FactCheckError::ApiError { status: 503, message } if message == "overloaded"
        ));
        assert_eq!(err.to_string(), "API error (status 503): overloaded");
    }
}

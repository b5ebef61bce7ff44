//! Translation Client
//!
//! Sends text to the configured chat-completion endpoint and returns the
//! translated text or a classified error. One attempt per invocation; the
//! caller decides whether the user retries.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Settings;

/// Translation policy sent as the system message. The model detects the
/// source language, translates Chinese to English and everything else to
/// Simplified Chinese, and outputs the translation only.
const SYSTEM_POLICY: &str = "You are a professional translator.\n\
Rules:\n\
1. Automatically detect the source language.\n\
2. If source is Chinese, translate to English.\n\
3. If source is English/Other, translate to Simplified Chinese.\n\
4. OUTPUT ONLY THE TRANSLATED TEXT. NO EXPLANATIONS, NO PREAMBLE.\n\
5. Maintain original tone and formatting.";

/// Low temperature keeps translations deterministic-leaning.
const TEMPERATURE: f32 = 0.3;

/// Classified translation failure.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// No API key configured; no network call was made.
    #[error("API key is missing. Please check settings.")]
    MissingCredential,
    /// HTTP 404: the endpoint URL itself is likely wrong.
    #[error("API endpoint not found (404). Check the URL setting; it usually ends with \"/v1/chat/completions\". Current: {endpoint}")]
    EndpointNotFound { endpoint: String },
    /// Any other non-2xx status, message taken from the error body when the
    /// server sent one.
    #[error("API request failed: {0}")]
    ApiError(String),
    /// 2xx response without the expected `choices[0].message.content` shape.
    #[error("invalid API response: missing choices/message")]
    MalformedResponse,
    /// Transport failure; no response at all.
    #[error("network error: {0}")]
    NetworkError(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Error body many chat-completion servers return with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Chat-completion HTTP client.
pub struct TranslationClient {
    http: reqwest::Client,
}

impl Default for TranslationClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Translate `text` according to the configured endpoint and model.
    ///
    /// The input travels verbatim as the user message; no truncation, no
    /// escaping beyond JSON encoding.
    pub async fn translate(&self, text: &str, settings: &Settings) -> Result<String, TranslateError> {
        if !settings.has_credential() {
            return Err(TranslateError::MissingCredential);
        }

        let request = ChatRequest {
            model: &settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_POLICY,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!(
            "Translating {} characters via {}",
            text.chars().count(),
            settings.api_endpoint
        );

        let response = self
            .http
            .post(&settings.api_endpoint)
            .bearer_auth(&settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| TranslateError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Status is classified before any attempt to parse a success body.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(TranslateError::EndpointNotFound {
                    endpoint: settings.api_endpoint.clone(),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
                if let Some(message) = parsed.error.and_then(|e| e.message) {
                    return Err(TranslateError::ApiError(message));
                }
            }
            let truncated: String = body.chars().take(200).collect();
            return Err(TranslateError::ApiError(format!("{status} - {truncated}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|_| TranslateError::MalformedResponse)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(TranslateError::MalformedResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> Settings {
        Settings {
            api_key: "sk-test".to_string(),
            api_endpoint: format!("{}/v1/chat/completions", server.uri()),
            model: "gpt-3.5-turbo".to_string(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        let mut settings = settings_for(&server);
        settings.api_key = String::new();

        let client = TranslationClient::new();
        let err = client.translate("hello", &settings).await.unwrap_err();

        assert!(matches!(err, TranslateError::MissingCredential));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_trims_whitespace() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "  Hola  "}}]
            })))
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        let result = client.translate("Hello", &settings_for(&server)).await.unwrap();
        assert_eq!(result, "Hola");
    }

    #[tokio::test]
    async fn test_request_carries_policy_and_verbatim_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "temperature": 0.3,
                "messages": [
                    {"role": "system"},
                    {"role": "user", "content": "line one\nline two"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        client
            .translate("line one\nline two", &settings_for(&server))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_404_names_the_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let settings = settings_for(&server);
        let client = TranslationClient::new();
        let err = client.translate("hello", &settings).await.unwrap_err();

        match &err {
            TranslateError::EndpointNotFound { endpoint } => {
                assert_eq!(endpoint, &settings.api_endpoint);
            }
            other => panic!("expected EndpointNotFound, got {other:?}"),
        }
        assert!(err.to_string().contains(&settings.api_endpoint));
    }

    #[tokio::test]
    async fn test_api_error_uses_server_message_when_parseable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit exceeded"}
            })))
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        let err = client
            .translate("hello", &settings_for(&server))
            .await
            .unwrap_err();

        match err {
            TranslateError::ApiError(message) => assert_eq!(message, "Rate limit exceeded"),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_falls_back_to_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        let err = client
            .translate("hello", &settings_for(&server))
            .await
            .unwrap_err();

        match err {
            TranslateError::ApiError(message) => {
                assert!(message.contains("500"));
                assert!(message.contains("upstream exploded"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        let err = client
            .translate("hello", &settings_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_missing_message_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let client = TranslationClient::new();
        let err = client
            .translate("hello", &settings_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::MalformedResponse));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let settings = Settings {
            api_key: "sk-test".to_string(),
            // Port 1 is never listening.
            api_endpoint: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            ..Settings::default()
        };

        let client = TranslationClient::new();
        let err = client.translate("hello", &settings).await.unwrap_err();
        assert!(matches!(err, TranslateError::NetworkError(_)));
    }
}

//! Schema normalization: one structuring-service call and reply parsing.
//!
//! This module is intentionally thin on prompt content — the full instruction
//! text lives in [`crate::prompts`] so it can evolve without touching request
//! shaping or parsing here.
//!
//! ## Request shapes
//!
//! Bedrock model families disagree on the request body. Newer chat-style
//! models take a `messages` array with an `anthropic_version` tag; older
//! models take a bare `prompt` plus `max_tokens_to_sample`. Both are variants
//! of one [`StructuringRequest`] selected by a substring of the model
//! identifier, which keeps the parsing logic below single-sourced instead of
//! duplicated per call site.
//!
//! ## Reply parsing
//!
//! Models wrap JSON in prose despite being told not to. The parser locates
//! the first `{` and the last `}` and parses the substring between them;
//! only if that fails does it try the raw reply, and only if both fail is
//! the reply malformed — reported with a bounded preview, never silently
//! substituted.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::fields::FieldMapping;
use crate::prompts;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::ProvideErrorMetadata;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde_json::{json, Value};
use tracing::{debug, info};

/// Maximum characters of a malformed reply preserved in failure detail.
pub const RESPONSE_PREVIEW_CHARS: usize = 200;

/// The outbound call to the structuring service.
///
/// One request per document; implementations keep no state between calls.
/// The default implementation is [`BedrockClient`]; tests substitute mocks.
#[async_trait]
pub trait StructuringClient: Send + Sync {
    /// Send `body` to the model and return the raw response body.
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, PipelineError>;
}

/// The two request-body shapes Bedrock model families accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuringRequest {
    /// Chat-style `messages` shape for the claude-3 family.
    Messages,
    /// Single `prompt` + `max_tokens_to_sample` shape for older models.
    LegacyPrompt,
}

impl StructuringRequest {
    /// Select the shape for a model identifier.
    pub fn for_model(model_id: &str) -> Self {
        if model_id.contains("claude-3") {
            Self::Messages
        } else {
            Self::LegacyPrompt
        }
    }

    /// Shape name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::LegacyPrompt => "legacy-prompt",
        }
    }

    /// Serialise the request body embedding `prompt`.
    pub fn body(&self, prompt: &str, max_tokens: usize) -> Result<Vec<u8>, PipelineError> {
        let value = match self {
            Self::Messages => json!({
                "anthropic_version": "bedrock-2023-05-31",
                "max_tokens": max_tokens,
                "messages": [
                    { "role": "user", "content": prompt }
                ]
            }),
            Self::LegacyPrompt => json!({
                "prompt": prompt,
                "max_tokens_to_sample": max_tokens,
            }),
        };
        serde_json::to_vec(&value)
            .map_err(|e| PipelineError::Internal(format!("request serialisation: {e}")))
    }

    /// Pull the completion text out of the raw response envelope.
    ///
    /// The messages shape answers with `content[0].text`; the legacy shape
    /// with a top-level `completion` string. An undecodable envelope is a
    /// malformed response.
    pub fn completion_text(&self, raw: &[u8]) -> Result<String, PipelineError> {
        let envelope: Value = serde_json::from_slice(raw).map_err(|_| {
            PipelineError::MalformedStructuringResponse {
                preview: preview(&String::from_utf8_lossy(raw)),
            }
        })?;
        let text = match self {
            Self::Messages => envelope
                .get("content")
                .and_then(|content| content.get(0))
                .and_then(|first| first.get("text"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Self::LegacyPrompt => envelope
                .get("completion")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };
        Ok(text)
    }
}

/// Structure non-empty document text into a field mapping.
///
/// The caller is responsible for never passing empty text. On success the
/// mapping reflects the service's reply as-is; canonical-field completeness
/// is checked by the orchestrator, not enforced here.
pub async fn normalize(
    client: &dyn StructuringClient,
    text: &str,
    config: &PipelineConfig,
) -> Result<FieldMapping, PipelineError> {
    let model_id = &config.model_id;
    let shape = StructuringRequest::for_model(model_id);
    let prompt = prompts::extraction_prompt(text);
    debug!(
        model_id,
        shape = shape.name(),
        input_chars = text.chars().count(),
        "sending structuring request"
    );

    let body = shape.body(&prompt, config.max_tokens)?;
    let raw = client.invoke(model_id, body).await?;
    let reply = shape.completion_text(&raw)?;

    if reply.trim().is_empty() {
        return Err(PipelineError::EmptyStructuringResponse {
            model_id: model_id.clone(),
        });
    }

    let object = extract_json_object(&reply)?;
    let mapping = FieldMapping::from_json_object(object);
    info!(fields = mapping.len(), "structuring service returned fields");
    Ok(mapping)
}

/// Locate and parse the JSON object inside a free-form reply.
///
/// First attempt: the substring from the first `{` to the last `}`. Second
/// attempt: the raw reply itself. Both failing — or the parsed value not
/// being an object — is a malformed response.
fn extract_json_object(reply: &str) -> Result<serde_json::Map<String, Value>, PipelineError> {
    let braced = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => Some(&reply[start..=end]),
        _ => None,
    };

    let parsed = braced
        .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .or_else(|| serde_json::from_str::<Value>(reply).ok());

    match parsed {
        Some(Value::Object(object)) => Ok(object),
        _ => Err(PipelineError::MalformedStructuringResponse {
            preview: preview(reply),
        }),
    }
}

/// First [`RESPONSE_PREVIEW_CHARS`] characters of `text`, char-boundary safe.
fn preview(text: &str) -> String {
    text.chars().take(RESPONSE_PREVIEW_CHARS).collect()
}

// ── Bedrock implementation ───────────────────────────────────────────────

/// [`StructuringClient`] backed by the Bedrock runtime.
#[derive(Debug, Clone)]
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockClient {
    /// Build a client for `region` using the default credential chain.
    pub async fn from_region(region: &str) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_bedrockruntime::Client::new(&shared),
        }
    }

    /// Wrap an already-configured client (custom endpoint, credentials).
    pub fn new(client: aws_sdk_bedrockruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StructuringClient for BedrockClient {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>, PipelineError> {
        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                let detail = match (e.code(), e.message()) {
                    (Some(code), Some(message)) => format!("[{code}] {message}"),
                    _ => e.to_string(),
                };
                PipelineError::StructuringTransport {
                    model_id: model_id.to_string(),
                    detail,
                }
            })?;
        Ok(response.body.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claude3_models_use_messages_shape() {
        assert_eq!(
            StructuringRequest::for_model("anthropic.claude-3-sonnet-20240229-v1:0"),
            StructuringRequest::Messages
        );
        assert_eq!(
            StructuringRequest::for_model("anthropic.claude-v2"),
            StructuringRequest::LegacyPrompt
        );
    }

    #[test]
    fn messages_body_carries_anthropic_version_and_prompt() {
        let body = StructuringRequest::Messages.body("extract this", 2000).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(value["max_tokens"], 2000);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "extract this");
    }

    #[test]
    fn legacy_body_uses_max_tokens_to_sample() {
        let body = StructuringRequest::LegacyPrompt.body("extract this", 2000).unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["prompt"], "extract this");
        assert_eq!(value["max_tokens_to_sample"], 2000);
        assert!(value.get("messages").is_none());
    }

    #[test]
    fn messages_envelope_yields_content_text() {
        let raw = br#"{"content":[{"type":"text","text":"{\"a\":\"1\"}"}]}"#;
        let text = StructuringRequest::Messages.completion_text(raw).unwrap();
        assert_eq!(text, r#"{"a":"1"}"#);
    }

    #[test]
    fn legacy_envelope_yields_completion() {
        let raw = br#"{"completion":" here you go "}"#;
        let text = StructuringRequest::LegacyPrompt.completion_text(raw).unwrap();
        assert_eq!(text, " here you go ");
    }

    #[test]
    fn missing_content_yields_empty_string() {
        let text = StructuringRequest::Messages.completion_text(b"{}").unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn undecodable_envelope_is_malformed() {
        let err = StructuringRequest::Messages
            .completion_text(b"<html>bad gateway</html>")
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedStructuringResponse { .. }
        ));
    }

    #[test]
    fn extracts_json_wrapped_in_prose() {
        let reply = "Sure! Here is the data:\n{\"applicant_name\":\"Jane Doe\",\"license_number\":\"A123\"}\nLet me know if needed.";
        let object = extract_json_object(reply).unwrap();
        assert_eq!(object["applicant_name"], "Jane Doe");
        assert_eq!(object["license_number"], "A123");
    }

    #[test]
    fn bare_json_parses_directly() {
        let object = extract_json_object(r#"{"email":"a@b.c"}"#).unwrap();
        assert_eq!(object["email"], "a@b.c");
    }

    #[test]
    fn braceless_prose_is_malformed_with_bounded_preview() {
        let reply = "I could not find any structured data in the document. ".repeat(10);
        let err = extract_json_object(&reply).unwrap_err();
        match err {
            PipelineError::MalformedStructuringResponse { preview } => {
                assert_eq!(preview.chars().count(), RESPONSE_PREVIEW_CHARS);
                assert!(reply.starts_with(&preview));
            }
            other => panic!("expected malformed response, got {other}"),
        }
    }

    #[test]
    fn json_array_reply_is_malformed() {
        let err = extract_json_object("[1, 2, 3]").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedStructuringResponse { .. }
        ));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(300);
        assert_eq!(preview(&text).chars().count(), RESPONSE_PREVIEW_CHARS);
    }
}

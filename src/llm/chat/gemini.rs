use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client;
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, GenerateRequest, GenerateResponse, GroundingChunk, WebReference };
use crate::llm::{ LlmConfig, LlmError, LlmErrorKind };

pub struct GeminiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        base_url: String,
        request_timeout: Option<std::time::Duration>
    ) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, api_key, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LlmError::new(LlmErrorKind::Auth, "Gemini API key is required for GeminiChatClient")
            })?;

        Self::new(api_key, config.base_url_or_default(), config.request_timeout)
    }

    fn api_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = build_request_body(request);
        let url = self.api_url(&request.model);

        info!(
            "GeminiChatClient::generate() → model={} web_search={} thinking_budget={:?}",
            request.model,
            request.web_search,
            request.thinking_budget
        );
        debug!("Prompt length: {} chars", request.prompt.chars().count());

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json
                ::from_str::<GeminiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(LlmError::from_status(status.as_u16(), message));
        }

        let parsed: GeminiResponse = serde_json
            ::from_str(&text)
            .map_err(|e| LlmError::malformed(format!("Failed to parse response: {}", e)))?;

        Ok(normalize_response(parsed))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn build_request_body(request: &GenerateRequest) -> GeminiRequest<'_> {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user"),
            parts: vec![RequestPart { text: &request.prompt }],
        }],
        system_instruction: request.system_instruction.as_deref().map(|text| GeminiContent {
            role: None,
            parts: vec![RequestPart { text }],
        }),
        tools: if request.web_search {
            vec![GeminiTool { google_search: GoogleSearch {} }]
        } else {
            Vec::new()
        },
        generation_config: request.thinking_budget.map(|thinking_budget| GenerationConfig {
            thinking_config: ThinkingConfig { thinking_budget },
        }),
    }
}

/// Answer text is the first candidate's non-thought text parts joined together.
fn normalize_response(resp: GeminiResponse) -> GenerateResponse {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return GenerateResponse::default();
    };

    let texts: Vec<String> = candidate.content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought.unwrap_or(false))
        .filter_map(|p| p.text)
        .collect();
    let text = if texts.is_empty() { None } else { Some(texts.concat()) };

    let grounding = candidate.grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .map(|chunk| GroundingChunk {
            web: chunk.web.map(|w| WebReference { title: w.title, uri: w.uri }),
        })
        .collect();

    GenerateResponse { text, grounding }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<RawGroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct RawGroundingChunk {
    #[serde(default)]
    web: Option<RawWeb>,
}

#[derive(Debug, Deserialize)]
struct RawWeb {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

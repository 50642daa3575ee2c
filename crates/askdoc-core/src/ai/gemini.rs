use std::pin::Pin;
use std::sync::OnceLock;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::AiError;
use super::sse::SseDecoder;
use crate::config::{self, Config, DEFAULT_MODEL};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Streamed reply fragments, in order. Dropping the stream cancels the request.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, AiError>> + Send>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Part {
    text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ErrorBody>,
}

/// Error payload the API may send in place of candidates
#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl ErrorBody {
    fn into_error(self) -> AiError {
        AiError::from_status(self.code, format!("{}: {}", self.status, self.message))
    }
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Text carried by one response payload, or the error it reports.
fn payload_text(payload: &str) -> Result<String, AiError> {
    let parsed: GenerateResponse = serde_json::from_str(payload)?;
    if let Some(error) = parsed.error {
        return Err(error.into_error());
    }
    Ok(parsed.text())
}

/// Sampling settings for a chat session or one-shot request
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub system_instruction: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl SessionOptions {
    pub fn new(system_instruction: &str, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            system_instruction: system_instruction.to_string(),
            temperature: Some(temperature),
            max_output_tokens: Some(max_output_tokens),
        }
    }

    fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            // Lowest latency: no extended reasoning
            thinking_config: ThinkingConfig { thinking_budget: 0 },
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

static CLIENT: OnceLock<GeminiClient> = OnceLock::new();
static MODEL_OVERRIDE: OnceLock<String> = OnceLock::new();

/// The process-wide client, built on first use.
///
/// A missing key is not remembered: the next call looks again.
pub fn client() -> Result<GeminiClient, AiError> {
    if let Some(client) = CLIENT.get() {
        return Ok(client.clone());
    }

    let settings = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        Config::new()
    });
    let api_key = config::resolve_api_key_with(
        |name| std::env::var(name).ok(),
        settings.api_key.clone(),
    )
    .ok_or_else(|| {
        warn!("no API key in environment or config");
        AiError::MissingCredential
    })?;

    let model = MODEL_OVERRIDE
        .get()
        .map(String::as_str)
        .unwrap_or_else(|| settings.model());
    let client = GeminiClient::new(&api_key).with_model(model);
    info!(model = %client.model, "initialized Gemini client");
    Ok(CLIENT.get_or_init(|| client).clone())
}

/// Override the configured model. Only the first call before the client is
/// built has any effect.
pub fn set_default_model(model: &str) {
    if MODEL_OVERRIDE.set(model.to_string()).is_err() {
        warn!(model, "model override already set, ignoring");
    }
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method)
    }

    async fn post(&self, url: &str, request: &GenerateRequest) -> Result<reqwest::Response, AiError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Gemini request failed");
            return Err(AiError::from_status(status, body));
        }

        Ok(response)
    }

    /// Single request/response completion.
    pub async fn generate(&self, prompt: &str, options: &SessionOptions) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: Content::text(None, &options.system_instruction),
            generation_config: options.generation_config(),
        };

        let response = self.post(&self.url("generateContent"), &request).await?;
        let text = payload_text(&response.text().await?)?;
        debug!(chars = text.len(), "generateContent finished");
        Ok(text)
    }

    /// One-shot completion with only a system instruction, using model defaults.
    pub async fn generate_once(&self, prompt: &str, system_instruction: &str) -> Result<String, AiError> {
        let options = SessionOptions {
            system_instruction: system_instruction.to_string(),
            temperature: None,
            max_output_tokens: None,
        };
        self.generate(prompt, &options).await
    }

    fn stream(&self, request: GenerateRequest) -> DeltaStream {
        let url = format!("{}?alt=sse", self.url("streamGenerateContent"));
        Box::pin(sse_deltas(self.clone(), url, request))
    }
}

fn sse_deltas(
    client: GeminiClient,
    url: String,
    request: GenerateRequest,
) -> impl Stream<Item = Result<String, AiError>> + Send {
    try_stream! {
        let response = client.post(&url, &request).await?;
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut yielded = false;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for event in decoder.push(&chunk) {
                let text = payload_text(&event)?;
                if !text.is_empty() {
                    yielded = true;
                    yield text;
                }
            }
        }

        if let Some(event) = decoder.finish() {
            let text = payload_text(&event)?;
            if !text.is_empty() {
                yielded = true;
                yield text;
            }
        }

        // Blocked or truncated replies end without any text
        if !yielded {
            warn!("stream ended without text");
            Err::<(), AiError>(AiError::EmptyResponse)?;
        }
    }
}

/// A multi-turn conversation held against the model.
#[derive(Debug, Clone)]
pub struct ChatSession {
    client: GeminiClient,
    options: SessionOptions,
    history: Vec<Content>,
    pending: Option<String>,
}

/// Build a chat session on the process-wide client.
///
/// Fails with [`AiError::MissingCredential`] when no key can be resolved.
pub fn create_session(
    system_instruction: &str,
    temperature: f32,
    max_output_tokens: u32,
) -> Result<ChatSession, AiError> {
    let client = client()?;
    Ok(ChatSession::new(
        client,
        SessionOptions::new(system_instruction, temperature, max_output_tokens),
    ))
}

impl ChatSession {
    pub fn new(client: GeminiClient, options: SessionOptions) -> Self {
        Self {
            client,
            options,
            history: Vec::new(),
            pending: None,
        }
    }

    /// Number of completed turns (user message plus reply).
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn request_for(&self, text: &str) -> GenerateRequest {
        let mut contents = self.history.clone();
        contents.push(Content::text(Some("user"), text));
        GenerateRequest {
            contents,
            system_instruction: Content::text(None, &self.options.system_instruction),
            generation_config: self.options.generation_config(),
        }
    }

    /// Send a user message and stream the reply.
    ///
    /// The turn stays pending until [`ChatSession::commit_reply`] or
    /// [`ChatSession::abandon_turn`] is called with the outcome.
    pub fn send_message_stream(&mut self, text: &str) -> DeltaStream {
        if self.pending.is_some() {
            warn!("previous turn was never settled, dropping it");
        }
        let request = self.request_for(text);
        self.pending = Some(text.to_string());
        self.client.stream(request)
    }

    /// Record the full reply of the pending turn in the history.
    ///
    /// An empty reply is not recorded: the API rejects turns without text, so the
    /// pending turn is dropped instead.
    pub fn commit_reply(&mut self, reply: &str) {
        if let Some(user_text) = self.pending.take() {
            if reply.trim().is_empty() {
                warn!("not recording an empty reply");
                return;
            }
            self.history.push(Content::text(Some("user"), &user_text));
            self.history.push(Content::text(Some("model"), reply));
        }
    }

    /// Forget the pending turn so the next send starts from the last good state.
    pub fn abandon_turn(&mut self) -> Option<String> {
        self.pending.take()
    }
}

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::decode;
use crate::error::InterpretError;
use crate::prompt;
use crate::{Interpreter, ParsedTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Gemini, Provider::OpenAI, Provider::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variable that overrides the stored key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            other => Err(format!("unknown provider '{other}' (expected gemini, openai or anthropic)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: Provider,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub timeout: Option<Duration>,
}

impl LlmSettings {
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: None,
            temperature: 0.0,
            timeout: None,
        }
    }

    fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// Interpreter backed by a hosted language model.
#[derive(Debug, Clone)]
pub struct LlmInterpreter {
    settings: LlmSettings,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LlmInterpreter {
    pub fn new(settings: LlmSettings, api_key: Option<String>) -> Result<Self, InterpretError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = settings.timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| InterpretError::transport(settings.provider, e))?;
        Ok(Self {
            settings,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Send the text and return the model's raw reply.
    pub async fn complete(&self, text: &str) -> Result<String, InterpretError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(InterpretError::MissingCredentials(self.settings.provider))?;
        let system = prompt::system_prompt();
        let user = prompt::user_prompt(text);

        tracing::debug!(provider = %self.settings.provider, model = %self.settings.model, "interpret request");
        match self.settings.provider {
            Provider::Gemini => self.gemini_complete(key, &system, &user).await,
            Provider::OpenAI => self.openai_complete(key, &system, &user).await,
            Provider::Anthropic => self.anthropic_complete(key, &system, &user).await,
        }
    }

    async fn gemini_complete(&self, key: &str, system: &str, user: &str) -> Result<String, InterpretError> {
        #[derive(Serialize, Deserialize)]
        struct Part {
            text: Option<String>,
        }

        #[derive(Serialize)]
        struct Content {
            #[serde(skip_serializing_if = "Option::is_none")]
            role: Option<&'static str>,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            response_mime_type: &'static str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req {
            system_instruction: Content,
            contents: Vec<Content>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<Part>,
        }

        let provider = Provider::Gemini;
        let body = Req {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(system.to_string()),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: Some(user.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                response_mime_type: "application/json",
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url(),
            self.settings.model
        );
        let resp = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::transport(provider, e))?;
        let resp = check_status(provider, resp).await?;

        let out: Resp = resp
            .json()
            .await
            .map_err(|e| InterpretError::Malformed(format!("parse gemini response: {e}")))?;

        // Blocked or empty generations come back without candidates.
        let Some(first) = out.candidates.into_iter().next() else {
            return Err(InterpretError::Declined);
        };
        let text: String = first
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn openai_complete(&self, key: &str, system: &str, user: &str) -> Result<String, InterpretError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ResponseFormat {
            #[serde(rename = "type")]
            t: &'static str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            response_format: ResponseFormat,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let provider = Provider::OpenAI;
        let body = Req {
            model: &self.settings.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system,
                },
                Msg {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.settings.temperature,
            response_format: ResponseFormat { t: "json_object" },
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.settings.base_url()))
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::transport(provider, e))?;
        let resp = check_status(provider, resp).await?;

        let out: Resp = resp
            .json()
            .await
            .map_err(|e| InterpretError::Malformed(format!("parse openai response: {e}")))?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    async fn anthropic_complete(&self, key: &str, system: &str, user: &str) -> Result<String, InterpretError> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'static str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            temperature: f32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let provider = Provider::Anthropic;
        let body = Req {
            model: &self.settings.model,
            max_tokens: 300,
            temperature: self.settings.temperature,
            system,
            messages: vec![Msg {
                role: "user",
                content: user,
            }],
        };

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.settings.base_url()))
            .header("x-api-key", key)
            .header("anthropic-version", "2023-06-01")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InterpretError::transport(provider, e))?;
        let resp = check_status(provider, resp).await?;

        let out: Resp = resp
            .json()
            .await
            .map_err(|e| InterpretError::Malformed(format!("parse anthropic response: {e}")))?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }
}

async fn check_status(provider: Provider, resp: reqwest::Response) -> Result<reqwest::Response, InterpretError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let txt = resp.text().await.unwrap_or_default();
    tracing::warn!(%provider, %status, "interpret request rejected");
    Err(InterpretError::Transport {
        provider,
        message: format!("{status} {}", txt.trim()),
    })
}

impl Interpreter for LlmInterpreter {
    async fn interpret(&self, text: &str) -> Result<ParsedTransaction, InterpretError> {
        if text.trim().is_empty() {
            return Err(InterpretError::EmptyInput);
        }
        let raw = self.complete(text).await?;
        let parsed = decode::decode(&raw);
        match &parsed {
            Ok(p) => tracing::info!(amount = %p.amount, kind = %p.kind, "interpreted entry"),
            Err(e) => tracing::info!(error = %e, "interpretation failed"),
        }
        parsed
    }
}

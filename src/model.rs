//! Language-model collaborator: prompt in, free-form reply out.
//!
//! The pipeline only depends on the [`ModelClient`] trait so tests (and alternative
//! providers) can inject fakes that return canned text or synthetic failures. The
//! default implementation speaks the OpenAI-compatible chat-completions dialect that
//! most hosted models expose.

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// The fixed system prompt sent with every chunk.
///
/// It pins down the reply grammar the parser expects; everything else about the reply
/// is advisory and handled by the parser's tolerance.
pub const SEGMENT_SYSTEM_PROMPT: &str = "\
Analyze the following subtitle content and split it into segments wherever the topic changes.

For every segment:

1. Title requirements:
   - at most 20 characters
   - lead with the core topic or the most quotable line
   - suited to short-video platforms; avoid academic phrasing

2. Time markers:
   - mark the segment's start and end time
   - place boundaries at natural topic changes, never mid-sentence

3. Summary requirements:
   - 50-100 words
   - highlight the claims and supporting arguments
   - keep striking examples or analogies
   - plain, concise language

Segmentation principles:
- prefer complete, logically coherent topics
- aim for 3-8 minutes per segment; major topics may run longer
- always split at a major topic change

Return the result in exactly this format:
Segment 1:
- Time: [start] --> [end]
- Title: xxx
- Summary: xxx

Segment 2:
...";

/// A collaborator that turns a text prompt into a text reply.
///
/// Implementations may fail with [`Error::ModelUnavailable`]; they must not try to
/// interpret the reply. Malformed reply text is not an error at this layer.
pub trait ModelClient {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Connection settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    /// API root, e.g. `https://api.openai.com/v1`. Provider-specific roots work as long
    /// as they expose `{base_url}/chat/completions`.
    pub base_url: String,
    pub model: String,
}

/// Blocking HTTP [`ModelClient`] for OpenAI-compatible chat-completions endpoints.
pub struct ChatClient {
    config: ModelConfig,
    http: reqwest::blocking::Client,
}

impl ChatClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl ModelClient for ChatClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!(chars = prompt.len(), model = %self.config.model, "requesting segmentation");

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": SEGMENT_SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|err| Error::ModelUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ModelUnavailable(format!("{url} returned {status}")));
        }

        let reply: Value = response
            .json()
            .map_err(|err| Error::ModelUnavailable(err.to_string()))?;
        extract_content(&reply)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response body.
fn extract_content(reply: &Value) -> Result<String> {
    reply["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::ModelUnavailable("reply carried no message content".to_string()))
}

//! HTTP adapter for the text-generation backend.
//!
//! The backend has answered with several envelope shapes over time, so the
//! response is run through an ordered list of extractors and the first one
//! that yields non-empty text wins.

use async_trait::async_trait;
use minijinja::{Environment, context};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::GenerationSettings;
use crate::task::{
    domain::Topic,
    ports::{GenerationError, GenerationResult, Generator},
};

const PROMPT_TEMPLATE_NAME: &str = "research_prompt";
const PROMPT_TEMPLATE: &str = "\
You are a meticulous research assistant. Write comprehensive, well-structured \
study notes in GitHub-flavoured markdown about the topic below.

Topic: {{ topic }}

Structure the notes with:
- an overview
- key concepts, each with a short explanation
- notable examples or applications
- common misconceptions
- a short list of further reading
";

/// Longest error body kept in [`GenerationError::Http`].
const MAX_ERROR_BODY_CHARS: usize = 512;

type Extractor = fn(&Value) -> Option<String>;

/// Known response envelopes, newest first.
const EXTRACTORS: [Extractor; 4] = [
    output_text_field,
    output_content_parts,
    chat_choice_message,
    content_text_blocks,
];

/// Generator that calls an HTTP text-generation API.
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    prompts: Environment<'static>,
}

impl HttpGenerator {
    /// Creates a generator with a default HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Prompt`] when the built-in prompt template
    /// fails to compile.
    pub fn new() -> GenerationResult<Self> {
        Self::with_client(Client::new())
    }

    /// Creates a generator using `client` for every call.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Prompt`] when the built-in prompt template
    /// fails to compile.
    pub fn with_client(client: Client) -> GenerationResult<Self> {
        let mut prompts = Environment::new();
        prompts
            .add_template(PROMPT_TEMPLATE_NAME, PROMPT_TEMPLATE)
            .map_err(|err| GenerationError::Prompt(err.to_string()))?;
        Ok(Self { client, prompts })
    }

    /// Renders the research prompt for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Prompt`] when rendering fails.
    pub fn render_prompt(&self, topic: &Topic) -> GenerationResult<String> {
        self.prompts
            .get_template(PROMPT_TEMPLATE_NAME)
            .and_then(|template| template.render(context! { topic => topic.as_str() }))
            .map_err(|err| GenerationError::Prompt(err.to_string()))
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        settings: &GenerationSettings,
        topic: &Topic,
    ) -> GenerationResult<String> {
        let prompt = self.render_prompt(topic)?;
        let request = json!({
            "model": settings.model,
            "input": prompt,
            "max_output_tokens": settings.max_tokens,
        });

        let response = self
            .client
            .post(&settings.base_url)
            .bearer_auth(&settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(GenerationError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(GenerationError::transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "generation backend responded");

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope: Value =
            serde_json::from_str(&body).map_err(|_| GenerationError::UnrecognizedResponse)?;
        extract_text(&envelope).ok_or(GenerationError::UnrecognizedResponse)
    }
}

/// Returns the text of the first envelope shape that matches.
#[must_use]
pub fn extract_text(envelope: &Value) -> Option<String> {
    EXTRACTORS
        .iter()
        .find_map(|extract| extract(envelope))
}

fn non_empty(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

fn joined_text_parts<'a>(parts: impl Iterator<Item = &'a Value>) -> Option<String> {
    let texts: Vec<&str> = parts
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    non_empty(texts.join("\n"))
}

/// `{"output_text": "..."}`
fn output_text_field(envelope: &Value) -> Option<String> {
    envelope
        .get("output_text")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .and_then(non_empty)
}

/// `{"output": [{"content": [{"type": "output_text", "text": "..."}]}]}`
fn output_content_parts(envelope: &Value) -> Option<String> {
    let output = envelope.get("output")?.as_array()?;
    joined_text_parts(
        output
            .iter()
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten(),
    )
}

/// `{"choices": [{"message": {"content": "..."}}]}`
fn chat_choice_message(envelope: &Value) -> Option<String> {
    envelope
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_owned)
        .and_then(non_empty)
}

/// `{"content": [{"type": "text", "text": "..."}]}`
fn content_text_blocks(envelope: &Value) -> Option<String> {
    let blocks = envelope.get("content")?.as_array()?;
    joined_text_parts(
        blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(json!({"output_text": "# Notes"}), Some("# Notes"))]
    #[case(
        json!({"output": [
            {"type": "reasoning", "summary": []},
            {"type": "message", "content": [
                {"type": "output_text", "text": "# Part one"},
                {"type": "output_text", "text": "## Part two"}
            ]}
        ]}),
        Some("# Part one\n## Part two")
    )]
    #[case(json!({"choices": [{"message": {"role": "assistant", "content": "# Chat"}}]}), Some("# Chat"))]
    #[case(
        json!({"content": [{"type": "thinking", "text": "hmm"}, {"type": "text", "text": "# Blocks"}]}),
        Some("# Blocks")
    )]
    #[case(json!({"output_text": "   ", "choices": [{"message": {"content": "# Fallback"}}]}), Some("# Fallback"))]
    #[case(json!({"output": []}), None)]
    #[case(json!({"result": "# Unknown"}), None)]
    #[case(json!("plain string"), None)]
    fn extract_text_tries_envelopes_in_order(#[case] envelope: Value, #[case] expected: Option<&str>) {
        assert_eq!(extract_text(&envelope).as_deref(), expected);
    }

    #[rstest]
    fn render_prompt_includes_topic() {
        let generator = HttpGenerator::new().expect("prompt template should compile");
        let topic = Topic::new("Photosynthesis").expect("valid topic");

        let prompt = generator
            .render_prompt(&topic)
            .expect("prompt should render");

        assert!(prompt.contains("Topic: Photosynthesis"));
    }
}

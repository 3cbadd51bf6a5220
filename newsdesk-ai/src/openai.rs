use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::AiError;
use crate::service::TextService;

/// Article bodies are cut to this many characters before prompting
const MAX_PROMPT_CONTENT_CHARS: usize = 4000;

/// Upper bound on topics returned from one extraction
const MAX_TOPICS: usize = 8;

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: "gpt-4o-mini".to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: String,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AiError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| AiError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| AiError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| AiError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AiError::api(format!("OpenAI API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(AiError::EmptyResponse)?;

        debug!("Model returned {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl TextService for OpenAIClient {
    #[instrument(skip(self, description))]
    async fn summarize(&self, title: &str, description: &str) -> Result<String, AiError> {
        let user_prompt = format!(
            r#"Summarize the following tech news article in 2-3 clear, concise sentences.
Focus on the key information and impact.

Title: {}
Description: {}

Summary:"#,
            title, description
        );

        self.complete(
            "You are a tech news summarizer. Create concise, informative summaries.",
            user_prompt,
            0.7,
            150,
        )
        .await
    }

    #[instrument(skip(self, titles), fields(count = titles.len()))]
    async fn extract_topics(&self, titles: &[String]) -> Result<Vec<String>, AiError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let headlines = titles
            .iter()
            .map(|t| format!("- {}", t))
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = format!(
            r#"Identify the 5-8 most prominent trending topics across these tech headlines.
Use short names of one or two words (for example "AI", "Security", "Electric Vehicles").

Headlines:
{}

Respond with a JSON array of strings only."#,
            headlines
        );

        let content = self
            .complete(
                "You are a tech news editor who groups headlines into trending topics.",
                user_prompt,
                0.3,
                200,
            )
            .await?;

        parse_topics(&content)
    }

    #[instrument(skip(self, content), fields(content_len = content.len()))]
    async fn summarize_full(&self, title: &str, content: &str) -> Result<String, AiError> {
        let excerpt: String = content.chars().take(MAX_PROMPT_CONTENT_CHARS).collect();
        let user_prompt = format!(
            r#"Provide a comprehensive 5-7 sentence summary of this tech news article, covering all key points, implications, and context.

Title: {}

Article Content:
{}

Comprehensive Summary:"#,
            title, excerpt
        );

        self.complete(
            "You are a tech news analyst. Create comprehensive, detailed summaries that cover all important aspects of the article.",
            user_prompt,
            0.7,
            400,
        )
        .await
    }

    #[instrument(skip(self, selected_text, context))]
    async fn explain(&self, selected_text: &str, context: &str) -> Result<String, AiError> {
        let context_block = if context.trim().is_empty() {
            String::new()
        } else {
            format!("\nSurrounding context:\n{}\n", context)
        };
        let user_prompt = format!(
            r#"Explain the following passage from a tech news article in plain language.
Define any jargon, give relevant background, and say why it matters.

Passage:
{}
{}
Explanation:"#,
            selected_text, context_block
        );

        self.complete(
            "You are a patient technology explainer for a general audience.",
            user_prompt,
            0.5,
            400,
        )
        .await
    }
}

/// Parse a topic list from a model reply (JSON array, possibly fenced)
fn parse_topics(content: &str) -> Result<Vec<String>, AiError> {
    let json_str = extract_json_array(content)?;
    let topics: Vec<String> = serde_json::from_str(&json_str)
        .map_err(|e| AiError::parse(format!("Failed to parse topics: {}", e)))?;

    let mut unique: Vec<String> = Vec::new();
    for topic in topics {
        let topic = topic.trim().to_string();
        if !topic.is_empty() && !unique.iter().any(|t| t.eq_ignore_ascii_case(&topic)) {
            unique.push(topic);
        }
    }
    unique.truncate(MAX_TOPICS);
    Ok(unique)
}

fn extract_json_array(content: &str) -> Result<String, AiError> {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try to find a raw array
    if let Some(start) = content.find('[') {
        if let Some(end) = content.rfind(']') {
            if end > start {
                return Ok(content[start..=end].to_string());
            }
        }
    }

    Err(AiError::parse("No JSON array found in response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topics_plain_array() {
        let topics = parse_topics(r#"["AI", "Security", "ai", " Cloud "]"#).unwrap();
        assert_eq!(topics, vec!["AI", "Security", "Cloud"]);
    }

    #[test]
    fn test_parse_topics_fenced() {
        let reply = "Here you go:\n```json\n[\"Gaming\", \"Space\"]\n```";
        assert_eq!(parse_topics(reply).unwrap(), vec!["Gaming", "Space"]);
    }

    #[test]
    fn test_parse_topics_caps_length() {
        let reply = serde_json::to_string(&(0..12).map(|i| format!("T{}", i)).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(parse_topics(&reply).unwrap().len(), MAX_TOPICS);
    }

    #[test]
    fn test_parse_topics_rejects_prose() {
        assert!(matches!(parse_topics("No topics today."), Err(AiError::Parse(_))));
    }
}

//! Chat runtime: turns an agent record plus user input into a token stream.
//!
//! The runtime does not interpret the model output; it assembles a chat
//! request from the record (system prompt, model) and proxies the provider's
//! stream. When no provider is configured it degrades to a deterministic
//! offline word-stream so the console stays usable without credentials.

use futures::stream;
use tracing::warn;

use crate::agent::AgentRecord;
use crate::llm::{ChatRequest, ChatStream, Message, Provider, ProviderRegistry, Role, StreamEvent};

/// Thin invocation layer shared across request handlers.
#[derive(Clone)]
pub struct AgentRuntime {
    providers: ProviderRegistry,
    provider: Provider,
    base_url: Option<String>,
}

impl AgentRuntime {
    pub fn new(providers: ProviderRegistry, provider: Provider, base_url: Option<String>) -> Self {
        Self {
            providers,
            provider,
            base_url,
        }
    }

    /// Produce a token stream for one user message against `record`.
    ///
    /// The stream always terminates with a `Done` event; provider errors
    /// surface as stream items, not as a call failure.
    pub async fn generate(&self, record: &AgentRecord, input: &str) -> ChatStream {
        let Some(provider) = self.providers.get(&self.provider, self.base_url.as_deref()) else {
            warn!(
                provider = %self.provider,
                agent = %record.id,
                "No LLM provider configured, using offline response"
            );
            return offline_stream(record, input);
        };

        let request = ChatRequest {
            model: record.model.clone(),
            messages: vec![
                Message {
                    role: Role::System,
                    content: record.system_prompt.clone(),
                },
                Message {
                    role: Role::User,
                    content: input.to_string(),
                },
            ],
            temperature: None,
            max_tokens: None,
        };

        match provider.chat_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, agent = %record.id, "LLM request failed, using offline response");
                offline_stream(record, input)
            }
        }
    }
}

/// Deterministic word-by-word response used when no provider is reachable.
fn offline_stream(record: &AgentRecord, input: &str) -> ChatStream {
    let intro = record
        .system_prompt
        .split(". ")
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("I'm ready to help.");

    let response = format!(
        "[{}] {} You said: {}",
        record.name,
        intro.trim_end_matches('.'),
        input
    );

    let events: Vec<_> = response
        .split(' ')
        .map(|word| Ok(StreamEvent::Token(format!("{word} "))))
        .chain(std::iter::once(Ok(StreamEvent::Done { usage: None })))
        .collect();

    Box::pin(stream::iter(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn sample_record() -> AgentRecord {
        AgentRecord {
            id: "r1".to_string(),
            name: "helper".to_string(),
            model: "gpt-4.1-mini".to_string(),
            system_prompt: "You are a concise assistant. Keep answers short.".to_string(),
            tools: Vec::new(),
            parent_agent_id: None,
            agent_type: None,
            capabilities: Vec::new(),
            specializations: Vec::new(),
            status: None,
        }
    }

    #[tokio::test]
    async fn unconfigured_runtime_streams_offline_response() {
        let runtime = AgentRuntime::new(ProviderRegistry::new(), Provider::OpenAI, None);
        let record = sample_record();

        let mut stream = runtime.generate(&record, "hello").await;

        let mut text = String::new();
        let mut saw_done = false;
        while let Some(event) = stream.next().await {
            match event.unwrap() {
                StreamEvent::Token(t) => text.push_str(&t),
                StreamEvent::Done { .. } => saw_done = true,
            }
        }

        assert!(saw_done);
        assert!(text.contains("[helper]"));
        assert!(text.contains("You are a concise assistant"));
        assert!(text.contains("hello"));
    }

    #[tokio::test]
    async fn offline_stream_is_deterministic() {
        let record = sample_record();
        let collect = |mut s: ChatStream| async move {
            let mut out = String::new();
            while let Some(Ok(StreamEvent::Token(t))) = s.next().await {
                out.push_str(&t);
            }
            out
        };

        let a = collect(offline_stream(&record, "ping")).await;
        let b = collect(offline_stream(&record, "ping")).await;
        assert_eq!(a, b);
    }
}

use serde_json::{Map, Value};

use counsel_config::{Config, LlmConfig, PipelineConfig, SearchConfig, Service};
use counsel_context::{TokenCounter, TokenizerError};
use counsel_domain::Chunk;

/// Deterministic stand-in for the model tokenizer: one token per
/// whitespace-separated word. Tests size their budgets against this count.
pub struct WordTokenCounter;
impl TokenCounter for WordTokenCounter {
	fn count(&self, text: &str) -> Result<usize, TokenizerError> {
		Ok(text.split_whitespace().count())
	}
}

/// A counter that always fails, for exercising tokenizer-failure paths.
pub struct FailingTokenCounter;
impl TokenCounter for FailingTokenCounter {
	fn count(&self, _text: &str) -> Result<usize, TokenizerError> {
		Err(TokenizerError::from("tokenizer exploded"))
	}
}

/// A config with production-default tunables, local-looking endpoints, and
/// no retry waits, so failure-injection tests finish quickly.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		search: SearchConfig {
			api_base: "http://127.0.0.1:9200".to_string(),
			api_key: "test-search-key".to_string(),
			path: "/indexes/contracts/docs/search".to_string(),
			page_size: 100,
			max_results: 10_000,
			timeout_ms: 5_000,
			default_headers: Map::new(),
		},
		llm: LlmConfig {
			api_base: "http://127.0.0.1:9300".to_string(),
			api_key: "test-llm-key".to_string(),
			path: "/chat/completions".to_string(),
			model: "test-model".to_string(),
			map_temperature: 0.3,
			reduce_temperature: 0.0,
			timeout_ms: 5_000,
			default_headers: Map::new(),
		},
		pipeline: PipelineConfig {
			map_max_tokens: 100_000,
			reduce_max_tokens: 10_000,
			reduce_group_size: 10,
			max_workers: 10,
			max_retries: 0,
			backoff_ms: 1,
			tokenizer_repo: "test-tokenizer".to_string(),
		},
	}
}

/// One indexed page of a document.
pub fn sample_chunk(document_id: &str, page: u32, content: &str) -> Chunk {
	Chunk {
		document_id: document_id.to_string(),
		page_number: Some(Value::from(page)),
		account: Some("Acme Holdings".to_string()),
		client_name: Some("Acme".to_string()),
		document_category: Some("IMA".to_string()),
		document_title: Some("Master Services Agreement".to_string()),
		link: Some(format!("https://docs.example.net/{document_id}/{page}")),
		content: Some(content.to_string()),
	}
}

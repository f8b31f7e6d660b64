use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub search: SearchConfig,
	pub llm: LlmConfig,
	pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

/// Connection settings for the chunk search backend. The backend exposes an
/// Azure-AI-Search-style document query endpoint: `POST {api_base}{path}` with
/// a boolean filter plus `top`/`skip` pagination.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	#[serde(default = "default_max_results")]
	pub max_results: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default = "default_map_temperature")]
	pub map_temperature: f32,
	#[serde(default)]
	pub reduce_temperature: f32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
	#[serde(default = "default_map_max_tokens")]
	pub map_max_tokens: u32,
	#[serde(default = "default_reduce_max_tokens")]
	pub reduce_max_tokens: u32,
	#[serde(default = "default_reduce_group_size")]
	pub reduce_group_size: u32,
	#[serde(default = "default_max_workers")]
	pub max_workers: u32,
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default = "default_backoff_ms")]
	pub backoff_ms: u64,
	pub tokenizer_repo: String,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_page_size() -> u32 {
	100
}

fn default_max_results() -> u32 {
	10_000
}

fn default_timeout_ms() -> u64 {
	60_000
}

fn default_map_temperature() -> f32 {
	0.3
}

fn default_map_max_tokens() -> u32 {
	100_000
}

fn default_reduce_max_tokens() -> u32 {
	10_000
}

fn default_reduce_group_size() -> u32 {
	10
}

fn default_max_workers() -> u32 {
	10
}

fn default_max_retries() -> u32 {
	3
}

fn default_backoff_ms() -> u64 {
	500
}

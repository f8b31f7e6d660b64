use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use counsel_config::Error;

const SAMPLE_CONFIG_TOML: &str = r#"
[service]
log_level = "info"

[search]
api_base = "https://search.example.net/"
api_key  = "search-key"
path     = "/indexes/contracts/docs/search"

[llm]
api_base = "https://llm.example.net"
api_key  = "llm-key"
path     = "/chat/completions"
model    = "gpt-4o"

[pipeline]
tokenizer_repo = "Qwen/Qwen3-Embedding-8B"
"#;

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_config(contents: &str) -> PathBuf {
	let stamp = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("Clock before the epoch.")
		.as_nanos();
	let unique = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("counsel_config_{stamp}_{unique}.toml"));

	fs::write(&path, contents).expect("Failed to write test config.");

	path
}

fn sample_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample.");
	let root = value.as_table_mut().expect("Sample config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render sample config.")
}

fn assert_validation_error(contents: &str, needle: &str) {
	let path = write_config(contents);
	let result = counsel_config::load(&path);
	let _ = fs::remove_file(&path);

	match result {
		Err(Error::Validation { message }) => {
			assert!(message.contains(needle), "unexpected message: {message}")
		},
		other => panic!("Expected a validation error, got {other:?}."),
	}
}

#[test]
fn loads_sample_config_with_defaults() {
	let path = write_config(SAMPLE_CONFIG_TOML);
	let cfg = counsel_config::load(&path).expect("Sample config must load.");
	let _ = fs::remove_file(&path);

	assert_eq!(cfg.search.page_size, 100);
	assert_eq!(cfg.search.max_results, 10_000);
	assert_eq!(cfg.pipeline.map_max_tokens, 100_000);
	assert_eq!(cfg.pipeline.reduce_max_tokens, 10_000);
	assert_eq!(cfg.pipeline.reduce_group_size, 10);
	assert_eq!(cfg.pipeline.max_workers, 10);
	assert_eq!(cfg.pipeline.max_retries, 3);
	assert!((cfg.llm.map_temperature - 0.3).abs() < f32::EPSILON);
	assert_eq!(cfg.llm.reduce_temperature, 0.0);
}

#[test]
fn normalizes_trailing_slashes_on_api_bases() {
	let path = write_config(SAMPLE_CONFIG_TOML);
	let cfg = counsel_config::load(&path).expect("Sample config must load.");
	let _ = fs::remove_file(&path);

	assert_eq!(cfg.search.api_base, "https://search.example.net");
}

#[test]
fn rejects_empty_api_key() {
	let contents = sample_with(|root| {
		let llm = root.get_mut("llm").and_then(Value::as_table_mut).expect("llm table");

		llm.insert("api_key".to_string(), Value::String("  ".to_string()));
	});

	assert_validation_error(&contents, "api_key");
}

#[test]
fn rejects_zero_page_size() {
	let contents = sample_with(|root| {
		let search = root.get_mut("search").and_then(Value::as_table_mut).expect("search table");

		search.insert("page_size".to_string(), Value::Integer(0));
	});

	assert_validation_error(&contents, "search.page_size");
}

#[test]
fn rejects_reduce_group_size_below_two() {
	let contents = sample_with(|root| {
		let pipeline =
			root.get_mut("pipeline").and_then(Value::as_table_mut).expect("pipeline table");

		pipeline.insert("reduce_group_size".to_string(), Value::Integer(1));
	});

	assert_validation_error(&contents, "reduce_group_size");
}

#[test]
fn rejects_out_of_range_temperature() {
	let contents = sample_with(|root| {
		let llm = root.get_mut("llm").and_then(Value::as_table_mut).expect("llm table");

		llm.insert("map_temperature".to_string(), Value::Float(3.5));
	});

	assert_validation_error(&contents, "map_temperature");
}

#[test]
fn rejects_zero_map_budget() {
	let contents = sample_with(|root| {
		let pipeline =
			root.get_mut("pipeline").and_then(Value::as_table_mut).expect("pipeline table");

		pipeline.insert("map_max_tokens".to_string(), Value::Integer(0));
	});

	assert_validation_error(&contents, "map_max_tokens");
}

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, LlmConfig, PipelineConfig, SearchConfig, Service};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("search.api_base", &cfg.search.api_base),
		("search.path", &cfg.search.path),
		("llm.api_base", &cfg.llm.api_base),
		("llm.path", &cfg.llm.path),
		("llm.model", &cfg.llm.model),
		("pipeline.tokenizer_repo", &cfg.pipeline.tokenizer_repo),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, key) in [("search", &cfg.search.api_key), ("llm", &cfg.llm.api_key)] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.search.page_size == 0 {
		return Err(Error::Validation {
			message: "search.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.timeout_ms == 0 || cfg.llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.timeout_ms and llm.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (label, temperature) in [
		("llm.map_temperature", cfg.llm.map_temperature),
		("llm.reduce_temperature", cfg.llm.reduce_temperature),
	] {
		if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-2.0."),
			});
		}
	}

	if cfg.pipeline.map_max_tokens == 0 {
		return Err(Error::Validation {
			message: "pipeline.map_max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.reduce_max_tokens == 0 {
		return Err(Error::Validation {
			message: "pipeline.reduce_max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.reduce_group_size < 2 {
		return Err(Error::Validation {
			message: "pipeline.reduce_group_size must be at least two.".to_string(),
		});
	}
	if cfg.pipeline.max_workers == 0 {
		return Err(Error::Validation {
			message: "pipeline.max_workers must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.backoff_ms == 0 {
		return Err(Error::Validation {
			message: "pipeline.backoff_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	while cfg.search.api_base.ends_with('/') {
		cfg.search.api_base.pop();
	}
	while cfg.llm.api_base.ends_with('/') {
		cfg.llm.api_base.pop();
	}

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}

use std::{fs, path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use counsel_context::HfTokenCounter;
use counsel_domain::ConversationTurn;
use counsel_pipeline::{Pipeline, QueryRequest, render_outcome};

#[derive(Debug, Parser)]
#[command(
	version = counsel_cli::VERSION,
	rename_all = "kebab",
	styles = counsel_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Id of the previously-indexed document to query. Matched
	/// case-insensitively.
	#[arg(long, value_name = "ID")]
	pub document_id: String,
	/// The natural-language question.
	#[arg(long, value_name = "TEXT")]
	pub query: String,
	/// Optional JSON file with prior conversation turns
	/// (`[{"role": "user", "content": "..."}, ...]`).
	#[arg(long, value_name = "FILE")]
	pub history: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = counsel_config::load(&args.config)?;
	init_tracing(&config);

	let counter = HfTokenCounter::from_pretrained(&config.pipeline.tokenizer_repo)
		.map_err(|err| color_eyre::eyre::eyre!(err))?;
	let conversation_history = match args.history.as_deref() {
		Some(path) => parse_history(&fs::read_to_string(path)?)?,
		None => Vec::new(),
	};
	let pipeline = Pipeline::new(config, Arc::new(counter));
	let outcome = pipeline
		.process_query(QueryRequest {
			document_id: args.document_id,
			query: args.query,
			conversation_history,
		})
		.await;

	if let Err(err) = &outcome {
		tracing::error!(error = %err, "Query pipeline failed.");
	}

	println!("{}", render_outcome(outcome));

	Ok(())
}

fn init_tracing(config: &counsel_config::Config) {
	let filter = EnvFilter::try_new(&config.service.log_level)
		.unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_history(raw: &str) -> color_eyre::Result<Vec<ConversationTurn>> {
	let turns: Vec<ConversationTurn> = serde_json::from_str(raw)?;

	Ok(turns)
}

#[cfg(test)]
mod tests {
	use super::*;

	use counsel_domain::Role;

	#[test]
	fn parses_a_history_file() {
		let raw = r#"[
			{ "role": "user", "content": "What about renewal?" },
			{ "role": "assistant", "content": "See section 4." }
		]"#;
		let turns = parse_history(raw).expect("parse failed");

		assert_eq!(turns.len(), 2);
		assert_eq!(turns[0].role, Role::User);
		assert_eq!(turns[1].role, Role::Assistant);
	}

	#[test]
	fn rejects_an_unknown_role() {
		let raw = r#"[{ "role": "operator", "content": "hello" }]"#;

		assert!(parse_history(raw).is_err());
	}
}

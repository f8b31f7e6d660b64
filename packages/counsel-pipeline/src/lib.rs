pub mod assemble;
pub mod error;
pub mod map;
pub mod query;
pub mod reduce;
pub mod retrieve;
pub mod retry;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use color_eyre::eyre;

use counsel_config::{Config, LlmConfig, SearchConfig};
use counsel_context::TokenCounter;
use counsel_domain::{Chunk, ConversationTurn, NO_MATCH_MESSAGE};
use counsel_providers::{chat, search};

pub use error::{Error, Result};
pub use query::QueryRequest;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Returned for every error kind except `Internal`.
pub const PIPELINE_ERROR_MESSAGE: &str =
	"An error occurred while processing your query. Please try again later.";
/// Returned for failures the pipeline cannot attribute to a known stage.
pub const UNEXPECTED_ERROR_MESSAGE: &str =
	"An unexpected error occurred. Please contact support.";

/// The single result of one query. Stage failures travel separately as
/// [`Error`] so the caller can pattern-match instead of catching.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
	Answer(String),
	NoMatch,
}

/// Collapses a pipeline result onto the caller-visible strings. Error detail
/// never crosses this boundary; it is logged where the error arises.
pub fn render_outcome(outcome: Result<Outcome>) -> String {
	match outcome {
		Ok(Outcome::Answer(text)) => text,
		Ok(Outcome::NoMatch) => NO_MATCH_MESSAGE.to_string(),
		Err(Error::Internal { .. }) => UNEXPECTED_ERROR_MESSAGE.to_string(),
		Err(_) => PIPELINE_ERROR_MESSAGE.to_string(),
	}
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchConfig,
		filter: &'a str,
		top: u32,
		skip: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Chunk>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmConfig,
		messages: &'a [ConversationTurn],
		temperature: f32,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchProvider>,
	pub chat: Arc<dyn ChatProvider>,
}
impl Providers {
	pub fn new(search: Arc<dyn SearchProvider>, chat: Arc<dyn ChatProvider>) -> Self {
		Self { search, chat }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { search: provider.clone(), chat: provider }
	}
}

struct DefaultProviders;

impl SearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchConfig,
		filter: &'a str,
		top: u32,
		skip: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<Chunk>>> {
		Box::pin(search::search(cfg, filter, top, skip))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmConfig,
		messages: &'a [ConversationTurn],
		temperature: f32,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(chat::complete(cfg, messages, temperature))
	}
}

/// One query pipeline. Holds no per-query state; a single instance serves
/// any number of concurrent queries.
pub struct Pipeline {
	pub(crate) cfg: Arc<Config>,
	pub(crate) providers: Providers,
	pub(crate) counter: Arc<dyn TokenCounter>,
}
impl Pipeline {
	pub fn new(cfg: Config, counter: Arc<dyn TokenCounter>) -> Self {
		Self::with_providers(cfg, counter, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		counter: Arc<dyn TokenCounter>,
		providers: Providers,
	) -> Self {
		Self { cfg: Arc::new(cfg), providers, counter }
	}
}

/// Every model call carries the configured deadline; a single stuck call
/// would otherwise stall the whole mapping phase.
pub(crate) async fn complete_bounded(
	chat: &dyn ChatProvider,
	cfg: &LlmConfig,
	messages: &[ConversationTurn],
	temperature: f32,
) -> color_eyre::Result<String> {
	let deadline = Duration::from_millis(cfg.timeout_ms);

	match tokio::time::timeout(deadline, chat.complete(cfg, messages, temperature)).await {
		Ok(result) => result,
		Err(_) => Err(eyre::eyre!("Model call exceeded the {}ms deadline.", cfg.timeout_ms)),
	}
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use counsel_domain::ConversationTurn;

use crate::{Outcome, Pipeline, Result, assemble, reduce, retrieve};

/// One query as delivered by the request layer. The history is forwarded
/// verbatim and forgotten when the call returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
	pub document_id: String,
	pub query: String,
	#[serde(default)]
	pub conversation_history: Vec<ConversationTurn>,
}

impl Pipeline {
	/// Answers one question against one document: retrieve, assemble,
	/// split, map concurrently, reduce. Short-circuits to
	/// [`Outcome::NoMatch`] when there is no document id, no chunk, or no
	/// surviving partial answer.
	pub async fn process_query(&self, request: QueryRequest) -> Result<Outcome> {
		let query_id = Uuid::new_v4();
		let document_id = request.document_id.trim();

		if document_id.is_empty() {
			tracing::info!(%query_id, "No document id supplied.");

			return Ok(Outcome::NoMatch);
		}

		let chunks =
			retrieve::retrieve(self.providers.search.as_ref(), &self.cfg, document_id).await?;

		if chunks.is_empty() {
			tracing::info!(%query_id, document_id, "No chunks retrieved.");

			return Ok(Outcome::NoMatch);
		}

		let entries = assemble::assemble(&chunks)?;

		tracing::info!(%query_id, entries = entries.len(), "Context assembled.");

		let batches = counsel_context::split_entries(
			entries,
			self.cfg.pipeline.map_max_tokens as usize,
			self.counter.as_ref(),
		)?;

		tracing::info!(%query_id, batches = batches.len(), "Context split into batches.");

		let partials = self
			.run_map_stage(query_id, batches, &request.query, &request.conversation_history)
			.await;

		tracing::info!(%query_id, partials = partials.len(), "Map stage finished.");

		if partials.is_empty() {
			return Ok(Outcome::NoMatch);
		}

		let answer = reduce::reduce(
			self.providers.chat.as_ref(),
			self.counter.as_ref(),
			&self.cfg,
			partials,
		)
		.await?;

		Ok(Outcome::Answer(answer))
	}
}

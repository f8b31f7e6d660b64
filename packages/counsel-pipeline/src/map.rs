use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use uuid::Uuid;

use counsel_config::Config;
use counsel_context::{ContextBatch, TokenCounter};
use counsel_domain::ConversationTurn;

use crate::{ChatProvider, Error, Pipeline, Result, complete_bounded, retry::with_retry};

pub(crate) const MAP_SYSTEM_PROMPT: &str = "\
You are an advanced AI assistant specialized in supporting the legal team \
with contract analysis. Your primary function is to help identify, extract, \
and summarize specific clauses or language within various types of \
contracts. Ensure all responses strictly adhere to the provided guidelines \
and formats.";

const MAP_FORMAT_INSTRUCTIONS: &str = "\
Provide a concise answer based on the given context and conversation \
history. The context is from a subset of a document. If there are no \
matches, simply return 'No matches found for the query' exactly.
If there are match(es):
- Always mention the page number the information comes from. Also identify \
the section of the document the citation is under and mention it in the \
response
- Cite the actual words from the document as well. Make sure there is \
enough context around the match in the citation
- Give a brief summary of the section the citation is from
- If a citation spans across multiple pages then always mention the page \
number as the lowest page where the citation starts from
- Use the following as an example output to ensure the formatting closely \
matches exactly like the example. Do not deviate from this format in any way:

Example Output:

1. **Page: page_number**
    - Under Section : Section Number and Section Heading
    - Section Summary: \"summary of the section the citation is derived from\"
    - Cited Text: \"content to be cited\"

2. **Page: page_number**
    - Under Section : Section Number and Section Heading
    - Section Summary: \"summary of the section the citation is derived from\"
    - Cited Text: \"content to be cited\"

Only provide the result in the given format. Do not hallucinate or use \
information that is not provided in the prompt.";

/// The fixed five-part map prompt: role instruction, serialized context,
/// caller history verbatim, the literal query, then the output-format
/// contract.
pub(crate) fn build_map_messages(
	context_json: &str,
	query: &str,
	history: &[ConversationTurn],
) -> Vec<ConversationTurn> {
	let mut messages = Vec::with_capacity(history.len() + 4);

	messages.push(ConversationTurn::system(MAP_SYSTEM_PROMPT));
	messages.push(ConversationTurn::user(format!("Context (JSON format):\n{context_json}")));
	messages.extend(history.iter().cloned());
	messages.push(ConversationTurn::user(format!("User's question: {query}")));
	messages.push(ConversationTurn::user(MAP_FORMAT_INSTRUCTIONS));

	messages
}

/// One model call over one batch. Guards the batch against the context
/// ceiling before spending a call on it.
pub(crate) async fn map_one(
	chat: &dyn ChatProvider,
	counter: &dyn TokenCounter,
	cfg: &Config,
	batch: &ContextBatch,
	query: &str,
	history: &[ConversationTurn],
) -> Result<String> {
	let context_json = batch
		.serialize()
		.map_err(|err| Error::Map { message: format!("Failed to serialize the batch: {err}.") })?;
	let tokens = counter
		.count(&context_json)
		.map_err(|err| Error::Map { message: format!("Tokenizer failure: {err}.") })?;
	let limit = cfg.pipeline.map_max_tokens as usize;

	if tokens > limit {
		return Err(Error::BatchTooLarge { tokens, limit });
	}

	let messages = build_map_messages(&context_json, query, history);
	let response = with_retry(&cfg.pipeline, "Map model call", || {
		complete_bounded(chat, &cfg.llm, &messages, cfg.llm.map_temperature)
	})
	.await
	.map_err(|err| Error::Map { message: err.to_string() })?;

	Ok(response.trim().to_string())
}

impl Pipeline {
	/// Runs one map call per batch on a worker pool of
	/// `min(max_workers, batch_count)`. Failed batches are logged and
	/// dropped; survivors are collected in completion order.
	pub(crate) async fn run_map_stage(
		&self,
		query_id: Uuid,
		batches: Vec<ContextBatch>,
		query: &str,
		history: &[ConversationTurn],
	) -> Vec<String> {
		let batch_count = batches.len();
		let workers = (self.cfg.pipeline.max_workers as usize).min(batch_count).max(1);
		let semaphore = Arc::new(Semaphore::new(workers));
		let query: Arc<str> = Arc::from(query);
		let history: Arc<[ConversationTurn]> = Arc::from(history.to_vec());
		let mut tasks = JoinSet::new();

		for (index, batch) in batches.into_iter().enumerate() {
			let semaphore = semaphore.clone();
			let cfg = self.cfg.clone();
			let chat = self.providers.chat.clone();
			let counter = self.counter.clone();
			let query = query.clone();
			let history = history.clone();

			tasks.spawn(async move {
				let _permit = match semaphore.acquire_owned().await {
					Ok(permit) => permit,
					Err(_) =>
						return (
							index,
							Err(Error::Internal { message: "Worker pool closed.".to_string() }),
						),
				};
				let outcome =
					map_one(chat.as_ref(), counter.as_ref(), &cfg, &batch, &query, &history).await;

				(index, outcome)
			});
		}

		let mut survivors: Vec<(usize, String)> = Vec::with_capacity(batch_count);

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((index, Ok(answer))) => {
					if answer.is_empty() {
						tracing::debug!(%query_id, batch = index, "Empty partial answer dropped.");
					} else {
						tracing::debug!(%query_id, batch = index, "Partial answer collected.");
						survivors.push((index, answer));
					}
				},
				Ok((index, Err(err))) => {
					tracing::error!(
						%query_id,
						batch = index,
						error = %err,
						"Map call failed. Dropping batch.",
					);
				},
				Err(err) => {
					tracing::error!(%query_id, error = %err, "Map task panicked. Dropping batch.");
				},
			}
		}

		survivors.into_iter().map(|(_, answer)| answer).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use counsel_domain::Role;

	#[test]
	fn prompt_has_five_parts_around_history() {
		let history =
			vec![ConversationTurn::user("Earlier question."), ConversationTurn::assistant("Earlier answer.")];
		let messages = build_map_messages("[]", "termination clause", &history);

		assert_eq!(messages.len(), 6);
		assert_eq!(messages[0].role, Role::System);
		assert!(messages[1].content.starts_with("Context (JSON format):"));
		assert_eq!(&messages[2..4], &history[..]);
		assert_eq!(messages[4].content, "User's question: termination clause");
		assert!(messages[5].content.contains("No matches found for the query"));
	}
}

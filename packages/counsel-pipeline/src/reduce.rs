use counsel_config::Config;
use counsel_context::TokenCounter;
use counsel_domain::ConversationTurn;

use crate::{ChatProvider, Error, Result, complete_bounded};

/// Marker between partial answers in a consolidation prompt.
pub(crate) const SUBRESPONSE_SEPARATOR: &str = "\n\n<subresponse>";

const REDUCE_SYSTEM_PROMPT: &str = "\
You are an advanced AI assistant specialized in summarizing information. \
Your task is to succinctly combine multiple summaries into a single \
coherent summary. Ensure strict adherence to the provided format and avoid \
any hallucinations.";

const REDUCE_INSTRUCTIONS: &str = "\
Given the following summaries, generate a single concise and coherent \
summary. Each subquery response is separated by <subresponse> tags.
- Ignore any subquery that indicates no matches were found.
- If all subqueries indicate no matches, respond with: \"No matches found \
for the query\".
- Ensure the final summary strictly follows the specified format without \
deviations.

Format:

1. **Page: page_number**
    - Under Section : Section Number and Section Heading
    - Section Summary: \"summary of the section the citation is derived from\"
    - Cited Text: \"content to be cited\"

2. **Page: page_number**
    - Under Section : Section Number and Section Heading
    - Section Summary: \"summary of the section the citation is derived from\"
    - Cited Text: \"content to be cited\"";

/// Consolidates the surviving partial answers into the final response.
///
/// While the joined partials overflow the reduce budget, they are summarized
/// in fixed-size groups and the group summaries become the next round's
/// input. Each round collapses whole groups to single summaries, so the item
/// count strictly shrinks and the loop bottoms out in a single consolidation
/// call. A lone partial is summarized in exactly one call regardless of
/// size.
pub(crate) async fn reduce(
	chat: &dyn ChatProvider,
	counter: &dyn TokenCounter,
	cfg: &Config,
	partials: Vec<String>,
) -> Result<String> {
	let max_tokens = cfg.pipeline.reduce_max_tokens as usize;
	let group_size = cfg.pipeline.reduce_group_size as usize;
	let mut partials = partials;

	loop {
		let combined = partials.join(SUBRESPONSE_SEPARATOR);
		let tokens = counter
			.count(&combined)
			.map_err(|err| Error::Reduce { message: format!("Tokenizer failure: {err}.") })?;

		if tokens <= max_tokens || partials.len() == 1 {
			return summarize(chat, cfg, &combined).await;
		}

		tracing::info!(
			partials = partials.len(),
			tokens,
			max_tokens,
			"Combined partial answers exceed the reduce budget. Summarizing in groups.",
		);

		let mut summaries = Vec::with_capacity(partials.len().div_ceil(group_size));

		for group in partials.chunks(group_size) {
			let combined = group.join(SUBRESPONSE_SEPARATOR);

			summaries.push(summarize(chat, cfg, &combined).await?);
		}

		partials = summaries;
	}
}

pub(crate) fn build_reduce_messages(combined: &str) -> Vec<ConversationTurn> {
	vec![
		ConversationTurn::system(REDUCE_SYSTEM_PROMPT),
		ConversationTurn::user(format!("{REDUCE_INSTRUCTIONS}\n\nSummaries:\n{combined}")),
	]
}

async fn summarize(chat: &dyn ChatProvider, cfg: &Config, combined: &str) -> Result<String> {
	let messages = build_reduce_messages(combined);
	let response = complete_bounded(chat, &cfg.llm, &messages, cfg.llm.reduce_temperature)
		.await
		.map_err(|err| {
			tracing::error!(error = %err, "Reduce model call failed.");

			Error::Reduce { message: err.to_string() }
		})?;

	Ok(response.trim().to_string())
}

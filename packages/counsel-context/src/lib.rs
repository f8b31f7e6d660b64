pub use tokenizers::Tokenizer;

use counsel_domain::ContextEntry;

pub type TokenizerError = tokenizers::Error;

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
	#[error("Failed to serialize a context entry.")]
	Serialize(#[from] serde_json::Error),
	#[error(transparent)]
	Tokenizer(#[from] TokenizerError),
}

/// Measures text the way the model's tokenizer does. The splitter, the map
/// guard, and the reduce loop all budget against this count.
pub trait TokenCounter
where
	Self: Send + Sync,
{
	fn count(&self, text: &str) -> Result<usize, TokenizerError>;
}

/// Counts with a Hugging Face tokenizer matching the target model family.
pub struct HfTokenCounter {
	tokenizer: Tokenizer,
}
impl HfTokenCounter {
	pub fn from_pretrained(repo: &str) -> Result<Self, TokenizerError> {
		Ok(Self { tokenizer: Tokenizer::from_pretrained(repo, None)? })
	}
}
impl TokenCounter for HfTokenCounter {
	fn count(&self, text: &str) -> Result<usize, TokenizerError> {
		Ok(self.tokenizer.encode(text, false)?.len())
	}
}

/// An ordered group of context entries whose canonical serialization stays
/// within the configured token ceiling.
#[derive(Clone, Debug, Default)]
pub struct ContextBatch {
	pub entries: Vec<ContextEntry>,
	pub token_count: usize,
}
impl ContextBatch {
	/// The 2-space-indented JSON array sent to the model as context.
	pub fn serialize(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(&self.entries)
	}
}

/// Greedy in-order bin packing. A batch closes when the next entry would push
/// it past `max_tokens`; the overflowing entry always lands in the batch it
/// opens, even when it alone is near or past the limit. Entries are never
/// split.
pub fn split_entries(
	entries: Vec<ContextEntry>,
	max_tokens: usize,
	counter: &dyn TokenCounter,
) -> Result<Vec<ContextBatch>, SplitError> {
	let mut batches = Vec::new();
	let mut current = ContextBatch::default();

	for entry in entries {
		let serialized = entry.canonical_json()?;
		let tokens = counter.count(&serialized)?;

		if tokens > max_tokens {
			tracing::warn!(
				tokens,
				max_tokens,
				"A single context entry exceeds the batch budget. It will occupy its own batch.",
			);
		}
		if current.token_count + tokens > max_tokens && !current.entries.is_empty() {
			batches.push(std::mem::take(&mut current));
		}

		current.entries.push(entry);
		current.token_count += tokens;
	}

	if !current.entries.is_empty() {
		batches.push(current);
	}

	Ok(batches)
}

#[cfg(test)]
mod tests {
	use super::*;

	use counsel_domain::Chunk;

	struct CharCounter;
	impl TokenCounter for CharCounter {
		fn count(&self, text: &str) -> Result<usize, TokenizerError> {
			Ok(text.chars().count())
		}
	}

	fn entry(content: &str) -> ContextEntry {
		ContextEntry::from_chunk(&Chunk {
			document_id: "DOC-1".to_string(),
			page_number: Some(serde_json::Value::from(1)),
			account: None,
			client_name: None,
			document_category: None,
			document_title: None,
			link: None,
			content: Some(content.to_string()),
		})
	}

	fn entry_cost(content: &str) -> usize {
		entry(content).canonical_json().expect("serialize failed").chars().count()
	}

	#[test]
	fn empty_input_produces_zero_batches() {
		let batches = split_entries(Vec::new(), 100, &CharCounter).expect("split failed");

		assert!(batches.is_empty());
	}

	#[test]
	fn batches_respect_the_budget_and_preserve_order() {
		let contents = ["alpha", "bravo", "charlie", "delta", "echo"];
		let entries: Vec<_> = contents.iter().map(|content| entry(content)).collect();
		let budget = entry_cost("charlie") * 2;
		let batches =
			split_entries(entries.clone(), budget, &CharCounter).expect("split failed");

		assert!(batches.len() > 1);

		for batch in &batches {
			assert!(batch.token_count <= budget || batch.entries.len() == 1);
		}

		let rejoined: Vec<_> = batches.into_iter().flat_map(|batch| batch.entries).collect();

		assert_eq!(rejoined, entries);
	}

	#[test]
	fn oversized_entry_occupies_its_own_batch() {
		let entries = vec![entry("tiny"), entry(&"x".repeat(400)), entry("small")];
		let budget = entry_cost("tiny") + 8;
		let batches = split_entries(entries, budget, &CharCounter).expect("split failed");

		assert_eq!(batches.len(), 3);
		assert_eq!(batches[1].entries.len(), 1);
		assert!(batches[1].token_count > budget);
	}

	#[test]
	fn single_small_entry_yields_one_batch() {
		let batches =
			split_entries(vec![entry("alpha")], 10_000, &CharCounter).expect("split failed");

		assert_eq!(batches.len(), 1);
		assert_eq!(batches[0].entries.len(), 1);
	}
}

pub mod chunk;
pub mod conversation;
pub mod entry;

pub use chunk::Chunk;
pub use conversation::{ConversationTurn, Role};
pub use entry::{ContextEntry, MISSING_FIELD, MISSING_LINK};

/// The literal no-match response. Map prompts instruct the model to emit it
/// verbatim, the reduce prompt filters on it, and the orchestrator returns it
/// for empty results.
pub const NO_MATCH_MESSAGE: &str = "No matches found for the query";

/// Document ids are matched case-insensitively; the backend stores them
/// uppercased.
pub fn normalize_document_id(raw: &str) -> String {
	raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn document_ids_are_trimmed_and_uppercased() {
		assert_eq!(normalize_document_id("  abc-1 "), "ABC-1");
	}
}

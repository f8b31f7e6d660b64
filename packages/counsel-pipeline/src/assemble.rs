use counsel_domain::{Chunk, ContextEntry};

use crate::{Error, Result};

/// Pure, order-preserving 1:1 transform from retrieved chunks to
/// prompt-ready entries. Missing optional fields default inside
/// [`ContextEntry::from_chunk`]; only structurally malformed records fail.
pub(crate) fn assemble(chunks: &[Chunk]) -> Result<Vec<ContextEntry>> {
	let mut entries = Vec::with_capacity(chunks.len());

	for chunk in chunks {
		let entry = ContextEntry::from_chunk(chunk);

		if !entry.page_number.is_string() && !entry.page_number.is_number() {
			return Err(Error::Assembly {
				message: format!(
					"Chunk for document {} carries a non-scalar page number.",
					chunk.document_id
				),
			});
		}

		entries.push(entry);
	}

	Ok(entries)
}

#[cfg(test)]
mod tests {
	use super::*;

	use serde_json::Value;

	fn chunk(page_number: Option<Value>) -> Chunk {
		Chunk {
			document_id: "ABC-1".to_string(),
			page_number,
			account: Some("Acme".to_string()),
			client_name: None,
			document_category: None,
			document_title: None,
			link: None,
			content: Some("Section 3.".to_string()),
		}
	}

	#[test]
	fn transforms_one_entry_per_chunk_in_order() {
		let chunks = vec![chunk(Some(Value::from(1))), chunk(Some(Value::from(2)))];
		let entries = assemble(&chunks).expect("assemble failed");

		assert_eq!(entries.len(), 2);
		assert_eq!(entries[0].page_number, Value::from(1));
		assert_eq!(entries[1].page_number, Value::from(2));
		assert_eq!(entries[0].account, "Acme");
		assert_eq!(entries[0].client_name, counsel_domain::MISSING_FIELD);
	}

	#[test]
	fn rejects_a_non_scalar_page_number() {
		let chunks = vec![chunk(Some(serde_json::json!({ "page": 1 })))];

		assert!(matches!(assemble(&chunks), Err(Error::Assembly { .. })));
	}
}

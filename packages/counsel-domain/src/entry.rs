use serde::Serialize;
use serde_json::Value;

use crate::Chunk;

pub const MISSING_FIELD: &str = "N/A";
pub const MISSING_LINK: &str = "#";

/// A chunk reshaped into the fixed key set the prompt expects. Field order is
/// the canonical key order of the serialized form; tokens are counted against
/// exactly this serialization.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextEntry {
	#[serde(rename = "Account")]
	pub account: String,
	#[serde(rename = "Client Name")]
	pub client_name: String,
	#[serde(rename = "Page Number")]
	pub page_number: Value,
	#[serde(rename = "Document Category")]
	pub document_category: String,
	#[serde(rename = "Document Title")]
	pub document_title: String,
	#[serde(rename = "Link")]
	pub link: String,
	#[serde(rename = "Content")]
	pub content: String,
}
impl ContextEntry {
	pub fn from_chunk(chunk: &Chunk) -> Self {
		Self {
			account: field_or_missing(chunk.account.as_deref()),
			client_name: field_or_missing(chunk.client_name.as_deref()),
			page_number: chunk
				.page_number
				.clone()
				.unwrap_or_else(|| Value::String(MISSING_FIELD.to_string())),
			document_category: field_or_missing(chunk.document_category.as_deref()),
			document_title: field_or_missing(chunk.document_title.as_deref()),
			link: chunk.link.clone().unwrap_or_else(|| MISSING_LINK.to_string()),
			content: chunk.content.clone().unwrap_or_default(),
		}
	}

	/// The 2-space-indented JSON form measured by the token budget and sent
	/// to the model.
	pub fn canonical_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}

fn field_or_missing(value: Option<&str>) -> String {
	match value {
		Some(value) => value.to_string(),
		None => MISSING_FIELD.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn bare_chunk() -> Chunk {
		Chunk {
			document_id: "DOC-1".to_string(),
			page_number: None,
			account: None,
			client_name: None,
			document_category: None,
			document_title: None,
			link: None,
			content: None,
		}
	}

	#[test]
	fn missing_fields_default_to_sentinels() {
		let entry = ContextEntry::from_chunk(&bare_chunk());

		assert_eq!(entry.account, MISSING_FIELD);
		assert_eq!(entry.page_number, Value::String(MISSING_FIELD.to_string()));
		assert_eq!(entry.link, MISSING_LINK);
		assert_eq!(entry.content, "");
	}

	#[test]
	fn canonical_json_preserves_key_order() {
		let mut chunk = bare_chunk();

		chunk.page_number = Some(Value::from(7));
		chunk.content = Some("Section 12.1 Termination.".to_string());

		let entry = ContextEntry::from_chunk(&chunk);
		let json = entry.canonical_json().expect("serialize failed");
		let account = json.find("\"Account\"").expect("Account key");
		let page = json.find("\"Page Number\"").expect("Page Number key");
		let content = json.find("\"Content\"").expect("Content key");

		assert!(account < page && page < content);
		assert!(json.contains("\"Page Number\": 7"));
	}
}

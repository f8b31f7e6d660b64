use serde::Deserialize;
use serde_json::Value;

/// One retrieved record for a document page, exactly as the search backend
/// returns it. Immutable once retrieved.
#[derive(Clone, Debug, Deserialize)]
pub struct Chunk {
	pub document_id: String,
	/// Page numbers come back numeric from most indexes but textual from
	/// legacy ones, so the raw JSON value is kept.
	#[serde(default)]
	pub page_number: Option<Value>,
	#[serde(default)]
	pub account: Option<String>,
	#[serde(default)]
	pub client_name: Option<String>,
	#[serde(default)]
	pub document_category: Option<String>,
	#[serde(default)]
	pub document_title: Option<String>,
	#[serde(default)]
	pub link: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
}

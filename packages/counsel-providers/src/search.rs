use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use counsel_domain::Chunk;

/// The fixed field-selection list; every retrieved record carries exactly
/// these fields.
pub const SELECT_FIELDS: [&str; 8] = [
	"account",
	"client_name",
	"page_number",
	"document_category",
	"document_title",
	"link",
	"content",
	"document_id",
];

/// One page of a filtered document query against the search backend.
pub async fn search(
	cfg: &counsel_config::SearchConfig,
	filter: &str,
	top: u32,
	skip: u32,
) -> Result<Vec<Chunk>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"search": "*",
		"filter": filter,
		"top": top,
		"skip": skip,
		"select": SELECT_FIELDS.join(","),
	});
	let res = client
		.post(url)
		.headers(crate::api_key_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<Vec<Chunk>> {
	let rows = json
		.get("value")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Search response is missing the value array."))?;
	let mut chunks = Vec::with_capacity(rows.len());

	for row in rows {
		let chunk: Chunk = serde_json::from_value(row.clone())
			.map_err(|err| eyre::eyre!("Search record is not a chunk: {err}."))?;

		chunks.push(chunk);
	}

	Ok(chunks)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_value_rows_into_chunks() {
		let json = serde_json::json!({
			"value": [
				{
					"document_id": "ABC-1",
					"page_number": 4,
					"content": "Either party may terminate...",
					"document_title": "Master Services Agreement"
				},
				{ "document_id": "ABC-1", "page_number": "5" }
			]
		});
		let chunks = parse_search_response(json).expect("parse failed");

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[0].document_id, "ABC-1");
		assert_eq!(chunks[0].page_number, Some(serde_json::Value::from(4)));
		assert!(chunks[1].content.is_none());
	}

	#[test]
	fn rejects_a_response_without_value_array() {
		let json = serde_json::json!({ "results": [] });

		assert!(parse_search_response(json).is_err());
	}
}

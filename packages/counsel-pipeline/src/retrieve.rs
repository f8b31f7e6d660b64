use counsel_config::Config;
use counsel_domain::Chunk;

use crate::{Error, Result, SearchProvider, retry::with_retry};

/// Fetches every chunk of one document in pages, stopping on an empty page,
/// a short page, or `max_results`. Returns the full eligible set or an
/// error; never a silently truncated set.
pub(crate) async fn retrieve(
	search: &dyn SearchProvider,
	cfg: &Config,
	document_id: &str,
) -> Result<Vec<Chunk>> {
	let normalized = counsel_domain::normalize_document_id(document_id);
	let filter = document_filter(&normalized);
	let page_size = cfg.search.page_size;
	let max_results = cfg.search.max_results as usize;
	let mut chunks: Vec<Chunk> = Vec::new();
	let mut skip = 0_u32;

	while chunks.len() < max_results {
		let remaining = (max_results - chunks.len()) as u32;
		let top = page_size.min(remaining);
		let page = with_retry(&cfg.pipeline, "Search page fetch", || {
			search.search(&cfg.search, &filter, top, skip)
		})
		.await
		.map_err(|err| {
			tracing::error!(
				document_id = %normalized,
				skip,
				error = %err,
				"Chunk retrieval failed.",
			);

			Error::Retrieval { document_id: normalized.clone(), message: err.to_string() }
		})?;
		let fetched = page.len();

		if fetched == 0 {
			break;
		}

		chunks.extend(page);

		skip += page_size;

		// A short page signals the end of the result set.
		if (fetched as u32) < top {
			break;
		}
	}

	Ok(chunks)
}

fn document_filter(document_id: &str) -> String {
	format!("document_id eq '{}'", document_id.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filter_quotes_the_normalized_id() {
		assert_eq!(document_filter("ABC-1"), "document_id eq 'ABC-1'");
	}

	#[test]
	fn filter_escapes_embedded_quotes() {
		assert_eq!(document_filter("A'B"), "document_id eq 'A''B'");
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Search backend failure for document {document_id}: {message}")]
	Retrieval { document_id: String, message: String },
	#[error("Malformed chunk record: {message}")]
	Assembly { message: String },
	#[error(transparent)]
	Split(#[from] counsel_context::SplitError),
	#[error("Context batch of {tokens} tokens exceeds the {limit} token ceiling.")]
	BatchTooLarge { tokens: usize, limit: usize },
	#[error("Model call failed for a context batch: {message}")]
	Map { message: String },
	#[error("Failed to consolidate partial answers: {message}")]
	Reduce { message: String },
	#[error("Internal pipeline failure: {message}")]
	Internal { message: String },
}
impl Error {
	/// Map-stage failures are isolated to their batch; every other kind
	/// aborts the query.
	pub fn is_per_batch(&self) -> bool {
		matches!(self, Self::Map { .. } | Self::BatchTooLarge { .. })
	}
}

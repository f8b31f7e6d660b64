use std::{future::Future, time::Duration};

use counsel_config::PipelineConfig;

const MAX_BACKOFF_MS: u64 = 30_000;

/// Retries a backend call with exponential backoff. `max_retries` counts
/// retries, not attempts: a value of 3 allows up to 4 calls.
pub(crate) async fn with_retry<T, F, Fut>(
	cfg: &PipelineConfig,
	label: &str,
	mut op: F,
) -> color_eyre::Result<T>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = color_eyre::Result<T>>,
{
	let mut attempt = 0_u32;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) => {
				attempt += 1;

				if attempt > cfg.max_retries {
					return Err(err);
				}

				let backoff = backoff_for_attempt(cfg.backoff_ms, attempt);

				tracing::warn!(
					error = %err,
					attempt,
					backoff_ms = backoff.as_millis() as u64,
					"{label} failed. Retrying.",
				);
				tokio::time::sleep(backoff).await;
			},
		}
	}
}

fn backoff_for_attempt(base_ms: u64, attempt: u32) -> Duration {
	let exp = attempt.saturating_sub(1).min(6);
	let capped = base_ms.saturating_mul(1 << exp).min(MAX_BACKOFF_MS);

	Duration::from_millis(capped)
}

use thiserror::Error;

/// Failures at the persistence seam. The engine never surfaces these to the
/// user; callers degrade to an empty layout.
#[derive(Debug, Error)]
pub enum LayoutError {
	#[error("layout json is malformed: {0}")]
	Json(#[from] serde_json::Error),
	#[error("layout schema version {found} is not supported (expected {expected})")]
	UnsupportedVersion { found: u32, expected: u32 },
	#[error("{0} is not a json array")]
	NotAnArray(&'static str),
	#[error("layout storage failed: {0}")]
	Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Embedding unavailable: {message}")]
	EmbeddingUnavailable { message: String },
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
}
impl From<pantry_storage::Error> for Error {
	fn from(err: pantry_storage::Error) -> Self {
		Self::StoreUnavailable { message: err.to_string() }
	}
}
impl From<pantry_providers::Error> for Error {
	fn from(err: pantry_providers::Error) -> Self {
		Self::EmbeddingUnavailable { message: err.to_string() }
	}
}

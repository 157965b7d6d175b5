pub mod filter;
pub mod query;
pub mod retrieval;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use filter::HardFilter;
pub use query::{Query, QueryNormalizer, QueryVariant};
pub use retrieval::{RankedItem, Retrieved, Retriever, Retrievers, Source};
pub use search::{RetrievalResult, ScoredCandidate, SearchEngine, SearchRequest, Strategy, Tier};

use std::{future::Future, pin::Pin, sync::Arc};

use pantry_config::{Config, EmbeddingProviderConfig};
use pantry_storage::{CatalogStore, memory::MemoryCatalog, pg::PgCatalog};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, pantry_providers::Result<Vec<Vec<f32>>>>;
}

/// OpenAI-compatible HTTP embeddings.
pub struct DefaultEmbedding;
impl EmbeddingProvider for DefaultEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, pantry_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(pantry_providers::embedding::embed(cfg, texts))
	}
}

/// Opens the catalog backend selected by `storage.backend`.
pub async fn open_store(cfg: &Config) -> Result<Arc<dyn CatalogStore>> {
	match cfg.storage.backend.as_str() {
		"postgres" => {
			let Some(pg) = cfg.storage.postgres.as_ref() else {
				return Err(Error::StoreUnavailable {
					message: "storage.postgres is required for the postgres backend.".to_string(),
				});
			};
			let catalog = PgCatalog::connect(pg).await?;

			Ok(Arc::new(catalog))
		},
		"memory" => {
			let Some(memory) = cfg.storage.memory.as_ref() else {
				return Err(Error::StoreUnavailable {
					message: "storage.memory is required for the memory backend.".to_string(),
				});
			};
			let catalog = MemoryCatalog::load(memory)?;

			tracing::info!(items = catalog.len(), "Loaded in-memory catalog.");

			Ok(Arc::new(catalog))
		},
		other => Err(Error::StoreUnavailable {
			message: format!("Unsupported storage backend {other:?}."),
		}),
	}
}

use std::{sync::Arc, time::Duration};

use pantry_config::EmbeddingProviderConfig;

use crate::{
	BoxFuture, EmbeddingProvider, Error, Result,
	query::Query,
	retrieval::{Retrieved, Retriever, Source, StoreAccess},
};

/// Cosine similarity between the semantic query embedding and item embeddings.
pub struct VectorRetriever {
	access: StoreAccess,
	embedding: Arc<dyn EmbeddingProvider>,
	embedding_cfg: EmbeddingProviderConfig,
	embedding_timeout: Duration,
	similarity_floor: f32,
}
impl VectorRetriever {
	pub fn new(
		access: StoreAccess,
		embedding: Arc<dyn EmbeddingProvider>,
		embedding_cfg: EmbeddingProviderConfig,
		embedding_timeout: Duration,
		similarity_floor: f32,
	) -> Self {
		Self { access, embedding, embedding_cfg, embedding_timeout, similarity_floor }
	}

	async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let texts = vec![text.to_string()];
		let embed = self.embedding.embed(&self.embedding_cfg, &texts);
		let vectors = tokio::time::timeout(self.embedding_timeout, embed).await.map_err(|_| {
			Error::EmbeddingUnavailable {
				message: format!(
					"Embedding timed out after {} ms.",
					self.embedding_timeout.as_millis()
				),
			}
		})??;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::EmbeddingUnavailable {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.embedding_cfg.dimensions as usize {
			return Err(Error::EmbeddingUnavailable {
				message: format!(
					"Embedding dimension mismatch: expected {}, got {}.",
					self.embedding_cfg.dimensions,
					vector.len()
				),
			});
		}
		if vector.iter().any(|value| !value.is_finite()) {
			return Err(Error::EmbeddingUnavailable {
				message: "Embedding contains non-finite values.".to_string(),
			});
		}

		Ok(vector)
	}
}
impl Retriever for VectorRetriever {
	fn source(&self) -> Source {
		Source::Vector
	}

	fn retrieve<'a>(&'a self, query: &'a Query, k: u32) -> BoxFuture<'a, Result<Retrieved>> {
		Box::pin(async move {
			if query.semantic_text.is_empty() {
				return Ok(Retrieved::default());
			}

			let vector = self.embed_query(&query.semantic_text).await?;
			let scope = query.scope();
			let hits = self
				.access
				.call(
					"vector_lookup",
					self.access.store().vector_lookup(&vector, k, self.similarity_floor, &scope),
				)
				.await?;
			let mut items = self.access.hydrate(hits, &scope, k).await?;

			items.retain(|ranked| ranked.score >= self.similarity_floor);

			let confident = !items.is_empty();

			Ok(Retrieved { items, confident })
		})
	}
}

#[cfg(test)]
mod tests {
	use pantry_storage::CatalogStore;
	use pantry_testkit::{
		fixtures::ItemBuilder,
		spy::{Operation, SpyCatalog},
	};

	use super::*;
	use crate::retrieval::fakes;

	/// Returns the same vector for every input.
	struct FixedEmbedding(Vec<f32>);
	impl EmbeddingProvider for FixedEmbedding {
		fn embed<'a>(
			&'a self,
			_cfg: &'a EmbeddingProviderConfig,
			texts: &'a [String],
		) -> BoxFuture<'a, pantry_providers::Result<Vec<Vec<f32>>>> {
			let vectors = texts.iter().map(|_| self.0.clone()).collect();

			Box::pin(async move { Ok(vectors) })
		}
	}

	fn embedding_cfg() -> EmbeddingProviderConfig {
		let mut cfg = pantry_testkit::config::dummy_embedding_provider();

		cfg.dimensions = 2;

		cfg
	}

	fn retriever(
		store: Arc<dyn CatalogStore>,
		query_vector: Vec<f32>,
		similarity_floor: f32,
	) -> VectorRetriever {
		VectorRetriever::new(
			StoreAccess::new(store, Duration::from_secs(1)),
			Arc::new(FixedEmbedding(query_vector)),
			embedding_cfg(),
			Duration::from_secs(1),
			similarity_floor,
		)
	}

	fn embedded_catalog() -> pantry_storage::memory::MemoryCatalog {
		fakes::catalog(vec![
			ItemBuilder::new("near", "Clam Soup").embedding(vec![1.0, 0.0]).build(),
			ItemBuilder::new("mid", "Rice Porridge").embedding(vec![0.6, 0.8]).build(),
			ItemBuilder::new("far", "Chocolate Cake").embedding(vec![0.0, 1.0]).build(),
		])
	}

	fn ids(retrieved: &Retrieved) -> Vec<&str> {
		retrieved.items.iter().map(|ranked| ranked.item.id.as_str()).collect()
	}

	#[tokio::test]
	async fn ranks_by_cosine_and_drops_items_below_the_floor() {
		let retriever = retriever(Arc::new(embedded_catalog()), vec![1.0, 0.0], 0.5);
		let retrieved = retriever
			.retrieve(&fakes::query("something warm", &[]), 10)
			.await
			.expect("Vector retrieval failed.");

		assert_eq!(ids(&retrieved), vec!["near", "mid"]);
		assert!((retrieved.items[1].score - 0.6).abs() < 1e-6);
	}

	#[tokio::test]
	async fn floor_applies_even_when_the_store_ignores_the_threshold() {
		let store = fakes::CannedVectorStore {
			catalog: embedded_catalog(),
			vector_hits: vec![
				fakes::hit("near", 0.9),
				fakes::hit("mid", 0.45),
				fakes::hit("far", 0.1),
			],
		};
		let retriever = retriever(Arc::new(store), vec![1.0, 0.0], 0.5);
		let retrieved = retriever
			.retrieve(&fakes::query("something warm", &[]), 10)
			.await
			.expect("Vector retrieval failed.");

		assert_eq!(ids(&retrieved), vec!["near"]);
	}

	#[tokio::test]
	async fn wrong_dimension_is_unavailable_and_skips_the_store() {
		let spy = SpyCatalog::new(embedded_catalog()).into_arc();
		let retriever = retriever(spy.clone(), vec![1.0, 0.0, 0.0], 0.5);
		let err = retriever
			.retrieve(&fakes::query("something warm", &[]), 10)
			.await
			.err()
			.expect("Expected a dimension error.");

		assert!(matches!(err, Error::EmbeddingUnavailable { .. }), "Unexpected error: {err}");
		assert!(err.to_string().contains("expected 2, got 3"));
		assert_eq!(spy.calls(Operation::VectorLookup), 0);
	}

	#[tokio::test]
	async fn non_finite_embedding_is_unavailable() {
		let retriever = retriever(Arc::new(embedded_catalog()), vec![f32::NAN, 1.0], 0.5);
		let err = retriever
			.retrieve(&fakes::query("something warm", &[]), 10)
			.await
			.err()
			.expect("Expected a non-finite embedding error.");

		assert!(matches!(err, Error::EmbeddingUnavailable { .. }), "Unexpected error: {err}");
	}
}

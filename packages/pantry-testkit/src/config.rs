use std::path::PathBuf;

use serde_json::Map;

use pantry_config::{
	Config, EmbeddingProviderConfig, MemoryCatalog, Postgres, Providers, Query, Search, Service,
	Storage,
};

use crate::embedding::BagOfWordsEmbedder;

/// Memory-backed configuration with default search settings and the fixture embedding dimension.
pub fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			backend: "memory".to_string(),
			postgres: None,
			memory: Some(MemoryCatalog {
				catalog_path: PathBuf::from("catalog.json"),
				title_weight: 1.0,
				body_weight: 0.4,
			}),
		},
		providers: Providers { embedding: dummy_embedding_provider() },
		search: Search::default(),
		query: Query::default(),
	}
}

/// Postgres-backed variant of [`test_config`].
pub fn test_pg_config(dsn: String) -> Config {
	let mut cfg = test_config();

	cfg.storage.backend = "postgres".to_string();
	cfg.storage.postgres =
		Some(Postgres { dsn, pool_max_conns: 2, vector_dim: BagOfWordsEmbedder::DIMENSIONS });

	cfg
}

pub fn dummy_embedding_provider() -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base: "http://127.0.0.1:1".to_string(),
		api_key: "test-key".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "test-embed".to_string(),
		dimensions: BagOfWordsEmbedder::DIMENSIONS,
		timeout_ms: 1_000,
		default_headers: Map::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_configs_validate() {
		pantry_config::validate(&test_config()).expect("Memory test config must validate.");
		pantry_config::validate(&test_pg_config("postgres://localhost/pantry".to_string()))
			.expect("Postgres test config must validate.");
	}
}

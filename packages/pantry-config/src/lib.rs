mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, HybridWeights, MemoryCatalog, PartialWeights, Postgres,
	Providers, Query, Search, SearchDiversity, SearchExact, SearchFusion, SearchFuzzy,
	SearchLexical, SearchVector, Service, SlotQuota, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	validate_storage(cfg)?;

	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}

	validate_search(cfg)?;

	for group in &cfg.query.synonyms {
		if group.iter().filter(|term| !term.trim().is_empty()).count() < 2 {
			return Err(Error::Validation {
				message: "query.synonyms groups must contain at least two non-empty terms."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_storage(cfg: &Config) -> Result<()> {
	match cfg.storage.backend.as_str() {
		"postgres" => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
			if postgres.vector_dim != cfg.providers.embedding.dimensions {
				return Err(Error::Validation {
					message:
						"providers.embedding.dimensions must match storage.postgres.vector_dim."
							.to_string(),
				});
			}
		},
		"memory" => {
			let Some(memory) = cfg.storage.memory.as_ref() else {
				return Err(Error::Validation {
					message: "storage.memory is required when storage.backend is memory."
						.to_string(),
				});
			};

			if memory.catalog_path.as_os_str().is_empty() {
				return Err(Error::Validation {
					message: "storage.memory.catalog_path must be non-empty.".to_string(),
				});
			}

			for (label, weight) in [
				("storage.memory.title_weight", memory.title_weight),
				("storage.memory.body_weight", memory.body_weight),
			] {
				if !weight.is_finite() || weight < 0.0 {
					return Err(Error::Validation {
						message: format!("{label} must be a finite number, zero or greater."),
					});
				}
			}
		},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of postgres or memory.".to_string(),
			});
		},
	}

	Ok(())
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	for (label, value) in [
		("search.default_limit", search.default_limit),
		("search.max_limit", search.max_limit),
		("search.candidate_k", search.candidate_k),
		("search.fuzzy.max_variants", search.fuzzy.max_variants),
		("search.lexical.max_terms", search.lexical.max_terms),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	if search.default_limit > search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be less than or equal to search.max_limit."
				.to_string(),
		});
	}
	if search.fuzzy.max_variants > 5 {
		return Err(Error::Validation {
			message: "search.fuzzy.max_variants must be 5 or less.".to_string(),
		});
	}

	for (label, value) in [
		("search.store_timeout_ms", search.store_timeout_ms),
		("search.embedding_timeout_ms", search.embedding_timeout_ms),
	] {
		if value == 0 {
			return Err(Error::Validation { message: format!("{label} must be greater than zero.") });
		}
	}

	for (label, value) in [
		("search.vector.similarity_floor", search.vector.similarity_floor),
		("search.fuzzy.min_similarity", search.fuzzy.min_similarity),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if !search.lexical.min_confident_score.is_finite() || search.lexical.min_confident_score < 0.0
	{
		return Err(Error::Validation {
			message: "search.lexical.min_confident_score must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if !search.exact.boost.is_finite() || search.exact.boost <= 0.0 {
		return Err(Error::Validation {
			message: "search.exact.boost must be a finite number greater than zero.".to_string(),
		});
	}
	if !search.fusion.rrf_k.is_finite() || search.fusion.rrf_k < 0.0 {
		return Err(Error::Validation {
			message: "search.fusion.rrf_k must be a finite number, zero or greater.".to_string(),
		});
	}

	let hybrid = &search.fusion.hybrid;

	validate_weights("search.fusion.hybrid", &[hybrid.vector, hybrid.lexical, hybrid.fuzzy])?;

	let partial = &search.fusion.partial;

	validate_weights("search.fusion.partial", &[partial.lexical, partial.fuzzy])?;

	let diversity = &search.diversity;

	if diversity.slot_hint_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.diversity.slot_hint_key must be non-empty.".to_string(),
		});
	}

	for quota in &diversity.slot_quotas {
		if quota.slot.trim().is_empty() {
			return Err(Error::Validation {
				message: "search.diversity.slot_quotas.slot must be non-empty.".to_string(),
			});
		}
		if quota.terms.iter().all(|term| term.trim().is_empty()) {
			return Err(Error::Validation {
				message: "search.diversity.slot_quotas.terms must contain a non-empty term."
					.to_string(),
			});
		}
		if quota.max == 0 {
			return Err(Error::Validation {
				message: "search.diversity.slot_quotas.max must be greater than zero.".to_string(),
			});
		}
	}

	Ok(())
}

fn validate_weights(label: &str, weights: &[f32]) -> Result<()> {
	for weight in weights {
		if !weight.is_finite() || *weight < 0.0 {
			return Err(Error::Validation {
				message: format!("{label} weights must be finite numbers, zero or greater."),
			});
		}
	}

	if weights.iter().sum::<f32>() <= 0.0 {
		return Err(Error::Validation {
			message: format!("{label} weights must not all be zero."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.search.diversity.attribute_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false)
	{
		cfg.search.diversity.attribute_key = None;
	}

	cfg.query.extra_stopwords.retain(|word| !word.trim().is_empty());

	for group in &mut cfg.query.synonyms {
		group.retain(|term| !term.trim().is_empty());
	}
}

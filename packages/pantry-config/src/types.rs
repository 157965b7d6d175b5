use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub query: Query,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	/// One of "postgres" or "memory".
	pub backend: String,
	pub postgres: Option<Postgres>,
	pub memory: Option<MemoryCatalog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
	pub vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryCatalog {
	/// JSON array of catalog items.
	pub catalog_path: PathBuf,
	#[serde(default = "default_title_weight")]
	pub title_weight: f32,
	#[serde(default = "default_body_weight")]
	pub body_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
	/// Per-retriever candidate depth. Raised to the request limit when smaller.
	pub candidate_k: u32,
	pub store_timeout_ms: u64,
	pub embedding_timeout_ms: u64,
	pub exact: SearchExact,
	pub vector: SearchVector,
	pub lexical: SearchLexical,
	pub fuzzy: SearchFuzzy,
	pub fusion: SearchFusion,
	pub diversity: SearchDiversity,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: 10,
			max_limit: 100,
			candidate_k: 50,
			store_timeout_ms: 2_000,
			embedding_timeout_ms: 5_000,
			exact: SearchExact::default(),
			vector: SearchVector::default(),
			lexical: SearchLexical::default(),
			fuzzy: SearchFuzzy::default(),
			fusion: SearchFusion::default(),
			diversity: SearchDiversity::default(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchExact {
	/// Multiplier applied to raw exact-match scores.
	pub boost: f32,
}
impl Default for SearchExact {
	fn default() -> Self {
		Self { boost: 2.0 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchVector {
	pub similarity_floor: f32,
}
impl Default for SearchVector {
	fn default() -> Self {
		Self { similarity_floor: 0.1 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchLexical {
	/// A lexical result set is confident when any raw score reaches this value.
	pub min_confident_score: f32,
	pub max_terms: u32,
}
impl Default for SearchLexical {
	fn default() -> Self {
		Self { min_confident_score: 0.5, max_terms: 16 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchFuzzy {
	pub min_similarity: f32,
	pub max_variants: u32,
}
impl Default for SearchFuzzy {
	fn default() -> Self {
		Self { min_similarity: 0.3, max_variants: 5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchFusion {
	pub rrf_k: f32,
	pub hybrid: HybridWeights,
	pub partial: PartialWeights,
}
impl Default for SearchFusion {
	fn default() -> Self {
		Self { rrf_k: 60.0, hybrid: HybridWeights::default(), partial: PartialWeights::default() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
	pub vector: f32,
	pub lexical: f32,
	/// Applied as configured; only vector and lexical are normalized against each other.
	pub fuzzy: f32,
}
impl Default for HybridWeights {
	fn default() -> Self {
		Self { vector: 0.6, lexical: 0.4, fuzzy: 0.2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PartialWeights {
	pub lexical: f32,
	pub fuzzy: f32,
}
impl Default for PartialWeights {
	fn default() -> Self {
		Self { lexical: 0.5, fuzzy: 0.5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDiversity {
	pub enabled: bool,
	/// Zero disables the cap.
	pub per_attribute_cap: u32,
	/// Metadata key holding the dominant attribute. Falls back to the first tag.
	pub attribute_key: Option<String>,
	/// Hint key carrying the requested meal slot.
	pub slot_hint_key: String,
	pub slot_quotas: Vec<SlotQuota>,
}
impl Default for SearchDiversity {
	fn default() -> Self {
		Self {
			enabled: true,
			per_attribute_cap: 2,
			attribute_key: Some("category".to_string()),
			slot_hint_key: "meal_slot".to_string(),
			slot_quotas: vec![SlotQuota {
				slot: "breakfast".to_string(),
				terms: vec!["egg".to_string(), "계란".to_string(), "달걀".to_string()],
				max: 1,
			}],
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuota {
	pub slot: String,
	pub terms: Vec<String>,
	pub max: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Query {
	pub extra_stopwords: Vec<String>,
	/// Each group is expanded bidirectionally.
	pub synonyms: Vec<Vec<String>>,
}

fn default_title_weight() -> f32 {
	1.0
}

fn default_body_weight() -> f32 {
	0.4
}

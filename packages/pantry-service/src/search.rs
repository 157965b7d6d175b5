mod cascade;
mod diversity;
mod fusion;

pub use cascade::{CascadeState, Transition};
pub use diversity::{dominant_attribute, select_diverse};
pub use fusion::{SourceRanking, fuse, hybrid_weights, normalize_weights, partial_weights, rrf};

use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
	time::Instant,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pantry_config::Config;
use pantry_storage::{
	CatalogStore,
	models::{Item, ItemKind},
};

use crate::{
	DefaultEmbedding, EmbeddingProvider, Error, Result,
	query::QueryNormalizer,
	retrieval::{Retrievers, Source},
};

/// The tier that produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
	Exact,
	Partial,
	Hybrid,
}
impl Tier {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Partial => "partial",
			Self::Hybrid => "hybrid",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Exact => "exact match",
			Self::Partial => "partial match",
			Self::Hybrid => "hybrid blend",
		}
	}
}

/// The tier that ended the cascade, or `None` when every tier came back empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	Exact,
	Partial,
	Hybrid,
	None,
}
impl Strategy {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Partial => "partial",
			Self::Hybrid => "hybrid",
			Self::None => "none",
		}
	}

	pub fn tier(self) -> Option<Tier> {
		match self {
			Self::Exact => Some(Tier::Exact),
			Self::Partial => Some(Tier::Partial),
			Self::Hybrid => Some(Tier::Hybrid),
			Self::None => None,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct ScoredCandidate {
	pub item: Arc<Item>,
	/// Raw, un-normalized score per contributing source.
	pub source_scores: BTreeMap<Source, f32>,
	pub fused_score: f32,
	pub tier: Tier,
}
impl ScoredCandidate {
	/// The raw score from `source`, or zero when that source did not return the item.
	pub fn source_score(&self, source: Source) -> f32 {
		self.source_scores.get(&source).copied().unwrap_or(0.0)
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct RetrievalResult {
	pub request_id: Uuid,
	pub candidates: Vec<ScoredCandidate>,
	pub strategy_used: Strategy,
	pub message: String,
	/// Sources that failed during this request and were treated as empty.
	pub degraded: Vec<Source>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub excluded_terms: Vec<String>,
	pub limit: Option<u32>,
	#[serde(default)]
	pub hints: HashMap<String, String>,
	pub kind: Option<ItemKind>,
}

pub struct SearchEngine {
	cfg: Config,
	normalizer: QueryNormalizer,
	retrievers: Retrievers,
}
impl SearchEngine {
	/// Builds an engine with the built-in retrievers and the HTTP embedding provider.
	pub fn new(cfg: Config, store: Arc<dyn CatalogStore>) -> Self {
		Self::with_embedding(cfg, store, Arc::new(DefaultEmbedding))
	}

	pub fn with_embedding(
		cfg: Config,
		store: Arc<dyn CatalogStore>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		let retrievers = Retrievers::from_store(&cfg, store, embedding);

		Self::with_retrievers(cfg, retrievers)
	}

	pub fn with_retrievers(cfg: Config, retrievers: Retrievers) -> Self {
		let normalizer = QueryNormalizer::new(&cfg);

		Self { cfg, normalizer, retrievers }
	}

	pub fn config(&self) -> &Config {
		&self.cfg
	}

	pub async fn search(&self, req: SearchRequest) -> Result<RetrievalResult> {
		let started = Instant::now();
		let request_id = Uuid::new_v4();
		let limit = self.resolve_limit(req.limit)?;
		let query = self.normalizer.normalize(&req.query, &req.excluded_terms, req.hints, req.kind)?;
		let k = self.cfg.search.candidate_k.max(limit);
		let outcome = cascade::run(&self.retrievers, &self.cfg.search, &query, k).await;
		let candidates = diversity::select_diverse(
			outcome.candidates,
			&self.cfg.search.diversity,
			&query.hints,
			limit as usize,
		);
		let strategy_used = if candidates.is_empty() { Strategy::None } else { outcome.strategy };
		let degraded: Vec<Source> = outcome.degraded.into_iter().collect();
		let message = build_message(strategy_used, candidates.len(), &degraded);

		tracing::info!(
			%request_id,
			query_hash = %query_hash(&query.raw),
			strategy = strategy_used.as_str(),
			results = candidates.len(),
			degraded = degraded.len(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"Search finished."
		);

		Ok(RetrievalResult { request_id, candidates, strategy_used, message, degraded })
	}

	pub async fn search_text(
		&self,
		query: &str,
		excluded_terms: &[String],
		limit: u32,
		hints: HashMap<String, String>,
	) -> Result<RetrievalResult> {
		self.search(SearchRequest {
			query: query.to_string(),
			excluded_terms: excluded_terms.to_vec(),
			limit: Some(limit),
			hints,
			kind: None,
		})
		.await
	}

	fn resolve_limit(&self, requested: Option<u32>) -> Result<u32> {
		let limit = requested.unwrap_or(self.cfg.search.default_limit);

		if limit == 0 {
			return Err(Error::InvalidQuery {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		Ok(limit.min(self.cfg.search.max_limit))
	}
}

pub fn build_message(strategy: Strategy, count: usize, degraded: &[Source]) -> String {
	let mut message = match strategy.tier() {
		Some(tier) if count > 0 => format!(
			"Found {count} {} via {}.",
			if count == 1 { "result" } else { "results" },
			tier.label()
		),
		_ => "No results found after exact, partial, and hybrid search.".to_string(),
	};

	if !degraded.is_empty() {
		let names: Vec<&str> = degraded.iter().map(|source| source.as_str()).collect();

		message.push_str(&format!(" Degraded sources: {}.", names.join(", ")));
	}

	message
}

/// Raw queries are never logged; a short content hash correlates repeated requests.
fn query_hash(raw: &str) -> String {
	let hash = blake3::hash(raw.as_bytes()).to_hex();

	hash.as_str()[..16].to_string()
}

mod exact;
mod fuzzy;
mod lexical;
mod vector;

pub use exact::ExactRetriever;
pub use fuzzy::FuzzyRetriever;
pub use lexical::LexicalRetriever;
pub use vector::VectorRetriever;

use std::{
	collections::HashMap,
	future::Future,
	sync::Arc,
	time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use pantry_config::Config;
use pantry_storage::{CatalogStore, LookupHit, LookupScope, models::Item};

use crate::{BoxFuture, EmbeddingProvider, Error, Result, filter::HardFilter, query::Query};

/// Retrieval source. The declaration order is also the order used for ties and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
	Exact,
	Lexical,
	Fuzzy,
	Vector,
}
impl Source {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Lexical => "lexical",
			Self::Fuzzy => "fuzzy",
			Self::Vector => "vector",
		}
	}
}

#[derive(Clone, Debug)]
pub struct RankedItem {
	pub item: Arc<Item>,
	pub score: f32,
}

/// One retriever's output, ordered by score descending then id ascending.
#[derive(Clone, Debug, Default)]
pub struct Retrieved {
	pub items: Vec<RankedItem>,
	/// Whether the scores are strong enough for the partial tier to stop on their own.
	pub confident: bool,
}
impl Retrieved {
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

pub trait Retriever
where
	Self: Send + Sync,
{
	fn source(&self) -> Source;

	fn retrieve<'a>(&'a self, query: &'a Query, k: u32) -> BoxFuture<'a, Result<Retrieved>>;
}

/// The retrievers a search engine dispatches to. Each can be replaced independently.
#[derive(Clone)]
pub struct Retrievers {
	pub exact: Arc<dyn Retriever>,
	pub lexical: Arc<dyn Retriever>,
	pub fuzzy: Arc<dyn Retriever>,
	pub vector: Arc<dyn Retriever>,
}
impl Retrievers {
	pub fn from_store(
		cfg: &Config,
		store: Arc<dyn CatalogStore>,
		embedding: Arc<dyn EmbeddingProvider>,
	) -> Self {
		let access = StoreAccess::new(store, Duration::from_millis(cfg.search.store_timeout_ms));

		Self {
			exact: Arc::new(ExactRetriever::new(access.clone())),
			lexical: Arc::new(LexicalRetriever::new(
				access.clone(),
				cfg.search.lexical.min_confident_score,
			)),
			fuzzy: Arc::new(FuzzyRetriever::new(access.clone(), cfg.search.fuzzy.min_similarity)),
			vector: Arc::new(VectorRetriever::new(
				access,
				embedding,
				cfg.providers.embedding.clone(),
				Duration::from_millis(cfg.search.embedding_timeout_ms),
				cfg.search.vector.similarity_floor,
			)),
		}
	}
}

/// Store handle shared by the built-in retrievers. Every call runs under the store timeout.
#[derive(Clone)]
pub struct StoreAccess {
	store: Arc<dyn CatalogStore>,
	timeout: Duration,
}
impl StoreAccess {
	pub fn new(store: Arc<dyn CatalogStore>, timeout: Duration) -> Self {
		Self { store, timeout }
	}

	pub fn store(&self) -> &dyn CatalogStore {
		self.store.as_ref()
	}

	pub async fn call<F, T>(&self, operation: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = pantry_storage::Result<T>>,
	{
		let started = Instant::now();

		match tokio::time::timeout(self.timeout, fut).await {
			Ok(result) => {
				let value = result?;

				tracing::trace!(
					operation,
					elapsed_ms = started.elapsed().as_millis() as u64,
					"Store call finished."
				);

				Ok(value)
			},
			Err(_) => Err(Error::StoreUnavailable {
				message: format!(
					"Store {operation} timed out after {} ms.",
					self.timeout.as_millis()
				),
			}),
		}
	}

	/// Turns raw hits into ranked items: drops unusable scores, loads the items, re-applies the hard
	/// filter, then sorts by score descending and id ascending and keeps the top `k`.
	pub async fn hydrate(
		&self,
		hits: Vec<LookupHit>,
		scope: &LookupScope,
		k: u32,
	) -> Result<Vec<RankedItem>> {
		let mut best: HashMap<String, f32> = HashMap::with_capacity(hits.len());

		for hit in hits {
			if !hit.raw_score.is_finite() || hit.raw_score <= 0.0 {
				continue;
			}

			let entry = best.entry(hit.item_id).or_insert(hit.raw_score);

			*entry = entry.max(hit.raw_score);
		}

		if best.is_empty() {
			return Ok(Vec::new());
		}

		let ids: Vec<String> = best.keys().cloned().collect();
		let items = self.call("fetch_items", self.store.fetch_items(&ids)).await?;
		let filter = HardFilter::from_scope(scope);
		let mut ranked: Vec<RankedItem> = filter
			.apply(items)
			.into_iter()
			.filter_map(|item| best.get(&item.id).map(|score| RankedItem { score: *score, item }))
			.collect();

		sort_ranked(&mut ranked);
		ranked.truncate(k as usize);

		Ok(ranked)
	}
}

pub(crate) fn sort_ranked(items: &mut [RankedItem]) {
	items.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.id.cmp(&b.item.id)));
}

/// Keeps the maximum score per item id.
pub(crate) fn merge_max(into: &mut HashMap<String, f32>, hits: Vec<LookupHit>) {
	for hit in hits {
		let entry = into.entry(hit.item_id).or_insert(hit.raw_score);

		*entry = entry.max(hit.raw_score);
	}
}

pub(crate) fn into_hits(scores: HashMap<String, f32>) -> Vec<LookupHit> {
	scores.into_iter().map(|(item_id, raw_score)| LookupHit { item_id, raw_score }).collect()
}

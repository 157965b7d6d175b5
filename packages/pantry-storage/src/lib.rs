pub mod db;
pub mod memory;
pub mod models;
pub mod pg;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin, sync::Arc};

use crate::models::{Item, ItemKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Restrictions every lookup applies before returning hits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupScope {
	/// Folded exclusion terms. An item is hidden when any of its tags contains one of them.
	pub excluded_terms: Vec<String>,
	pub kind: Option<ItemKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LookupHit {
	pub item_id: String,
	pub raw_score: f32,
}

/// Read-only catalog access used by the retrievers.
///
/// Every lookup returns hits ordered by `raw_score` descending, then `item_id` ascending, and never
/// returns an item that falls outside `scope`.
///
/// Text inputs and `scope.excluded_terms` are folded (NFKC, lowercase, trimmed) by the store, so
/// callers may pass them as typed.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	/// Cosine similarity between `vector` and each stored embedding, keeping scores >= `threshold`.
	fn vector_lookup<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		threshold: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>>;

	/// Weighted full-text relevance over title and body. Terms are OR-joined prefix matches.
	fn full_text_lookup<'a>(
		&'a self,
		terms: &'a [String],
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>>;

	/// Substring containment or trigram similarity against the title, keeping scores >=
	/// `min_similarity`.
	fn fuzzy_lookup<'a>(
		&'a self,
		term: &'a str,
		limit: u32,
		min_similarity: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>>;

	/// Title equality, title containment, or body containment of the whole `text`.
	fn exact_lookup<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>>;

	/// Loads full items. Unknown ids are skipped; output order is unspecified.
	fn fetch_items<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Arc<Item>>>>;
}

/// Exact-lookup score tiers shared by every store implementation.
pub mod exact_scores {
	pub const TITLE_EQUALS: f32 = 1.0;
	pub const TITLE_CONTAINS: f32 = 0.8;
	pub const BODY_CONTAINS: f32 = 0.5;
}

/// Fuzzy-lookup containment scores. Trigram similarity fills in below these.
pub mod fuzzy_scores {
	pub const TITLE_CONTAINS: f32 = 1.0;
	pub const BODY_CONTAINS: f32 = 0.75;
}

pub(crate) fn sort_hits(hits: &mut [LookupHit]) {
	hits.sort_by(|a, b| {
		b.raw_score.total_cmp(&a.raw_score).then_with(|| a.item_id.cmp(&b.item_id))
	});
}

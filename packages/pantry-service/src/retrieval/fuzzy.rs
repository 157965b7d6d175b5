use std::collections::HashMap;

use pantry_storage::LookupScope;

use crate::{
	BoxFuture, Result,
	query::{Query, QueryVariant},
	retrieval::{self, Retrieved, Retriever, Source, StoreAccess},
};

/// Variant-by-variant containment and trigram matching. Stops at the first variant that yields
/// results; variants are never merged.
pub struct FuzzyRetriever {
	access: StoreAccess,
	min_similarity: f32,
}
impl FuzzyRetriever {
	pub fn new(access: StoreAccess, min_similarity: f32) -> Self {
		Self { access, min_similarity }
	}

	async fn lookup_text(
		&self,
		text: &str,
		k: u32,
		scope: &LookupScope,
		scores: &mut HashMap<String, f32>,
	) -> Result<()> {
		let store = self.access.store();
		let (exact, fuzzy) = tokio::join!(
			self.access.call("exact_lookup", store.exact_lookup(text, k, scope)),
			self.access.call(
				"fuzzy_lookup",
				store.fuzzy_lookup(text, k, self.min_similarity, scope)
			),
		);

		retrieval::merge_max(scores, exact?);
		retrieval::merge_max(scores, fuzzy?);

		Ok(())
	}
}
impl Retriever for FuzzyRetriever {
	fn source(&self) -> Source {
		Source::Fuzzy
	}

	fn retrieve<'a>(&'a self, query: &'a Query, k: u32) -> BoxFuture<'a, Result<Retrieved>> {
		Box::pin(async move {
			let scope = query.scope();

			for (index, variant) in query.variants.iter().enumerate() {
				let mut scores = HashMap::new();

				match variant {
					QueryVariant::Text(text) => {
						self.lookup_text(text, k, &scope, &mut scores).await?;
					},
					QueryVariant::AnyOf(alternatives) =>
						for alternative in alternatives {
							self.lookup_text(alternative, k, &scope, &mut scores).await?;
						},
				}

				let items = self.access.hydrate(retrieval::into_hits(scores), &scope, k).await?;

				if !items.is_empty() {
					tracing::debug!(variant = index, results = items.len(), "Fuzzy variant matched.");

					return Ok(Retrieved { items, confident: true });
				}
			}

			Ok(Retrieved::default())
		})
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::Arc, time::Duration};

	use pantry_storage::{memory::MemoryCatalog, models::Item};
	use pantry_testkit::{
		fixtures::ItemBuilder,
		spy::{Operation, SpyCatalog},
	};

	use super::*;
	use crate::retrieval::fakes;

	const STRICT_SIMILARITY: f32 = 0.9;

	fn spy_retriever(items: Vec<Item>) -> (Arc<SpyCatalog<MemoryCatalog>>, FuzzyRetriever) {
		let spy = SpyCatalog::new(fakes::catalog(items)).into_arc();
		let access = StoreAccess::new(spy.clone(), Duration::from_secs(1));

		(spy, FuzzyRetriever::new(access, STRICT_SIMILARITY))
	}

	fn ids(retrieved: &Retrieved) -> Vec<&str> {
		retrieved.items.iter().map(|ranked| ranked.item.id.as_str()).collect()
	}

	#[tokio::test]
	async fn stops_at_the_first_variant_with_results() {
		let (spy, retriever) = spy_retriever(vec![
			ItemBuilder::new("a", "Kimchi Stew").build(),
			ItemBuilder::new("c", "Stew Pot").build(),
		]);
		let query = fakes::query("kimchi stew", &[]);

		assert!(matches!(query.variants.last(), Some(QueryVariant::AnyOf(_))));

		let retrieved = retriever.retrieve(&query, 10).await.expect("Fuzzy retrieval failed.");

		// The any-of variant would also match "Stew Pot"; it must never run.
		assert_eq!(ids(&retrieved), vec!["a"]);
		assert!(retrieved.confident);
		assert_eq!(spy.calls(Operation::ExactLookup), 1);
		assert_eq!(spy.calls(Operation::FuzzyLookup), 1);
	}

	#[tokio::test]
	async fn any_of_variant_runs_only_after_text_variants_miss() {
		let (spy, retriever) = spy_retriever(vec![
			ItemBuilder::new("a", "Kimchi Stew").build(),
			ItemBuilder::new("b", "Tofu Bowl").build(),
		]);
		let query = fakes::query("kimchi tofu", &[]);
		let text_variants = query
			.variants
			.iter()
			.filter(|variant| matches!(variant, QueryVariant::Text(_)))
			.count();
		let retrieved = retriever.retrieve(&query, 10).await.expect("Fuzzy retrieval failed.");

		assert_eq!(ids(&retrieved), vec!["a", "b"]);
		assert!(retrieved.items.iter().all(|ranked| ranked.score == 1.0));
		// One lookup per text variant, then one per any-of alternative.
		assert_eq!(spy.calls(Operation::ExactLookup), text_variants + 2);
	}

	#[tokio::test]
	async fn no_variant_matching_returns_empty() {
		let (_, retriever) = spy_retriever(vec![ItemBuilder::new("a", "Kimchi Stew").build()]);
		let retrieved = retriever
			.retrieve(&fakes::query("chocolate cake", &[]), 10)
			.await
			.expect("Fuzzy retrieval failed.");

		assert!(retrieved.is_empty());
		assert!(!retrieved.confident);
	}
}

use crate::{
	BoxFuture, Result,
	query::Query,
	retrieval::{Retrieved, Retriever, Source, StoreAccess},
};

/// Whole-phrase containment or equality against title and body.
pub struct ExactRetriever {
	access: StoreAccess,
}
impl ExactRetriever {
	pub fn new(access: StoreAccess) -> Self {
		Self { access }
	}
}
impl Retriever for ExactRetriever {
	fn source(&self) -> Source {
		Source::Exact
	}

	fn retrieve<'a>(&'a self, query: &'a Query, k: u32) -> BoxFuture<'a, Result<Retrieved>> {
		Box::pin(async move {
			let scope = query.scope();
			let phrase = query.exact_phrase();
			let hits = self
				.access
				.call("exact_lookup", self.access.store().exact_lookup(phrase, k, &scope))
				.await?;
			let items = self.access.hydrate(hits, &scope, k).await?;
			let confident = !items.is_empty();

			Ok(Retrieved { items, confident })
		})
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::Arc, time::Duration};

	use pantry_testkit::fixtures::ItemBuilder;

	use super::*;
	use crate::retrieval::fakes;

	fn retriever() -> ExactRetriever {
		let catalog = fakes::catalog(vec![
			ItemBuilder::new("a", "Kimchi Stew").tags(&["pork"]).build(),
			ItemBuilder::new("b", "Kimchi Stew with Tofu").tags(&["tofu"]).build(),
			ItemBuilder::new("c", "Soybean Stew").body("Cooked like kimchi stew.").build(),
			ItemBuilder::new("d", "Clam Soup").build(),
		]);

		ExactRetriever::new(StoreAccess::new(Arc::new(catalog), Duration::from_secs(1)))
	}

	fn ids(retrieved: &Retrieved) -> Vec<(&str, f32)> {
		retrieved.items.iter().map(|ranked| (ranked.item.id.as_str(), ranked.score)).collect()
	}

	#[tokio::test]
	async fn scores_title_equality_above_containment() {
		let retrieved = retriever()
			.retrieve(&fakes::query("kimchi stew", &[]), 10)
			.await
			.expect("Exact retrieval failed.");

		assert_eq!(ids(&retrieved), vec![("a", 1.0), ("b", 0.8), ("c", 0.5)]);
		assert!(retrieved.confident);
	}

	#[tokio::test]
	async fn excluded_tags_never_surface() {
		let retrieved = retriever()
			.retrieve(&fakes::query("kimchi stew", &["Pork"]), 10)
			.await
			.expect("Exact retrieval failed.");

		assert_eq!(ids(&retrieved), vec![("b", 0.8), ("c", 0.5)]);
	}

	#[tokio::test]
	async fn no_match_is_empty_and_not_confident() {
		let retrieved = retriever()
			.retrieve(&fakes::query("chocolate cake", &[]), 10)
			.await
			.expect("Exact retrieval failed.");

		assert!(retrieved.is_empty());
		assert!(!retrieved.confident);
	}
}

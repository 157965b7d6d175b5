use crate::{
	BoxFuture, Result,
	query::Query,
	retrieval::{Retrieved, Retriever, Source, StoreAccess},
};

/// Weighted full-text relevance over the synonym-expanded terms.
pub struct LexicalRetriever {
	access: StoreAccess,
	min_confident_score: f32,
}
impl LexicalRetriever {
	pub fn new(access: StoreAccess, min_confident_score: f32) -> Self {
		Self { access, min_confident_score }
	}
}
impl Retriever for LexicalRetriever {
	fn source(&self) -> Source {
		Source::Lexical
	}

	fn retrieve<'a>(&'a self, query: &'a Query, k: u32) -> BoxFuture<'a, Result<Retrieved>> {
		Box::pin(async move {
			if query.lexical_terms.is_empty() {
				return Ok(Retrieved::default());
			}

			let scope = query.scope();
			let hits = self
				.access
				.call(
					"full_text_lookup",
					self.access.store().full_text_lookup(&query.lexical_terms, k, &scope),
				)
				.await?;
			let items = self.access.hydrate(hits, &scope, k).await?;
			let confident = items.iter().any(|ranked| ranked.score >= self.min_confident_score);

			Ok(Retrieved { items, confident })
		})
	}
}

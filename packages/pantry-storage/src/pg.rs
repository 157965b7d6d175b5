use std::sync::Arc;

use crate::{
	BoxFuture, CatalogStore, LookupHit, LookupScope, Result, db::Db, models::Item, queries,
};

/// Postgres catalog backed by pgvector, `tsvector` ranking, and `pg_trgm`.
pub struct PgCatalog {
	db: Db,
}
impl PgCatalog {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	/// Connects and bootstraps the schema for the configured vector dimension.
	pub async fn connect(cfg: &pantry_config::Postgres) -> Result<Self> {
		let db = Db::connect(cfg).await?;

		db.ensure_schema(cfg.vector_dim).await?;

		Ok(Self { db })
	}

	pub fn db(&self) -> &Db {
		&self.db
	}
}
impl CatalogStore for PgCatalog {
	fn vector_lookup<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		threshold: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(queries::vector_lookup(&self.db.pool, vector, limit, threshold, scope))
	}

	fn full_text_lookup<'a>(
		&'a self,
		terms: &'a [String],
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(queries::full_text_lookup(&self.db.pool, terms, limit, scope))
	}

	fn fuzzy_lookup<'a>(
		&'a self,
		term: &'a str,
		limit: u32,
		min_similarity: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(queries::fuzzy_lookup(&self.db.pool, term, limit, min_similarity, scope))
	}

	fn exact_lookup<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(queries::exact_lookup(&self.db.pool, text, limit, scope))
	}

	fn fetch_items<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Arc<Item>>>> {
		Box::pin(queries::fetch_items(&self.db.pool, ids))
	}
}

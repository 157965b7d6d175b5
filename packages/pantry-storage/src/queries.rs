use std::sync::Arc;

use serde_json::Value;
use sqlx::PgPool;

use pantry_domain::{exclusion, text};

use crate::{
	Error, LookupHit, LookupScope, Result, exact_scores, fuzzy_scores,
	models::{CatalogItemRow, Item, ItemKind},
};

pub async fn upsert_item(pool: &PgPool, item: &Item) -> Result<()> {
	let embedding = item.embedding.as_deref().map(vector_to_pg);

	sqlx::query(
		"\
INSERT INTO catalog_items (item_id, kind, title, body, tags, metadata, embedding, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7::text::vector, now())
ON CONFLICT (item_id) DO UPDATE
SET
	kind = EXCLUDED.kind,
	title = EXCLUDED.title,
	body = EXCLUDED.body,
	tags = EXCLUDED.tags,
	metadata = EXCLUDED.metadata,
	embedding = EXCLUDED.embedding,
	updated_at = now()",
	)
	.bind(item.id.as_str())
	.bind(item.kind.as_str())
	.bind(item.title.as_str())
	.bind(item.body.as_str())
	.bind(&item.tags)
	.bind(Value::Object(item.metadata.clone()))
	.bind(embedding)
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn fetch_items(pool: &PgPool, ids: &[String]) -> Result<Vec<Arc<Item>>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<CatalogItemRow> = sqlx::query_as(
		"\
SELECT item_id, kind, title, body, tags, metadata, embedding::text AS embedding_text
FROM catalog_items
WHERE item_id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(pool)
	.await?;
	let mut items = Vec::with_capacity(rows.len());

	for row in rows {
		items.push(Arc::new(row_to_item(row)?));
	}

	Ok(items)
}

pub async fn vector_lookup(
	pool: &PgPool,
	vector: &[f32],
	limit: u32,
	threshold: f32,
	scope: &LookupScope,
) -> Result<Vec<LookupHit>> {
	let rows: Vec<(String, f32)> = sqlx::query_as(
		"\
SELECT item_id, raw_score
FROM (
	SELECT item_id, (1 - (embedding <=> $1::text::vector))::real AS raw_score
	FROM catalog_items
	WHERE embedding IS NOT NULL
		AND ($2::text IS NULL OR kind = $2)
		AND NOT EXISTS (
			SELECT 1
			FROM unnest(tags) AS tag, unnest($3::text[]) AS term
			WHERE strpos(regexp_replace(lower(normalize(tag, NFKC)), '[[:space:]]+', ' ', 'g'), term) > 0
		)
) AS scored
WHERE raw_score >= $4::real
ORDER BY raw_score DESC, item_id ASC
LIMIT $5",
	)
	.bind(vector_to_pg(vector))
	.bind(scope.kind.map(ItemKind::as_str))
	.bind(exclusion::normalize_terms(&scope.excluded_terms))
	.bind(threshold)
	.bind(i64::from(limit))
	.fetch_all(pool)
	.await?;

	Ok(into_hits(rows))
}

pub async fn full_text_lookup(
	pool: &PgPool,
	terms: &[String],
	limit: u32,
	scope: &LookupScope,
) -> Result<Vec<LookupHit>> {
	let Some(tsquery) = prefix_tsquery(terms) else {
		return Ok(Vec::new());
	};
	let rows: Vec<(String, f32)> = sqlx::query_as(
		"\
SELECT item_id, ts_rank(search_vec, query)::real AS raw_score
FROM catalog_items, to_tsquery('simple', $1) AS query
WHERE search_vec @@ query
	AND ($2::text IS NULL OR kind = $2)
	AND NOT EXISTS (
		SELECT 1
		FROM unnest(tags) AS tag, unnest($3::text[]) AS term
		WHERE strpos(regexp_replace(lower(normalize(tag, NFKC)), '[[:space:]]+', ' ', 'g'), term) > 0
	)
ORDER BY raw_score DESC, item_id ASC
LIMIT $4",
	)
	.bind(tsquery)
	.bind(scope.kind.map(ItemKind::as_str))
	.bind(exclusion::normalize_terms(&scope.excluded_terms))
	.bind(i64::from(limit))
	.fetch_all(pool)
	.await?;

	Ok(into_hits(rows))
}

pub async fn fuzzy_lookup(
	pool: &PgPool,
	term: &str,
	limit: u32,
	min_similarity: f32,
	scope: &LookupScope,
) -> Result<Vec<LookupHit>> {
	let term = text::fold(term.trim());

	if term.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<(String, f32)> = sqlx::query_as(
		"\
SELECT item_id, raw_score
FROM (
	SELECT
		item_id,
		GREATEST(
			CASE
				WHEN strpos(lower(normalize(title, NFKC)), $1::text) > 0 THEN $2::real
				WHEN strpos(lower(normalize(body, NFKC)), $1) > 0 THEN $3::real
				ELSE 0
			END,
			similarity(lower(normalize(title, NFKC)), $1)
		)::real AS raw_score
	FROM catalog_items
	WHERE ($4::text IS NULL OR kind = $4)
		AND NOT EXISTS (
			SELECT 1
			FROM unnest(tags) AS tag, unnest($5::text[]) AS term
			WHERE strpos(regexp_replace(lower(normalize(tag, NFKC)), '[[:space:]]+', ' ', 'g'), term) > 0
		)
) AS scored
WHERE raw_score > 0 AND raw_score >= $6::real
ORDER BY raw_score DESC, item_id ASC
LIMIT $7",
	)
	.bind(&term)
	.bind(fuzzy_scores::TITLE_CONTAINS)
	.bind(fuzzy_scores::BODY_CONTAINS)
	.bind(scope.kind.map(ItemKind::as_str))
	.bind(exclusion::normalize_terms(&scope.excluded_terms))
	.bind(min_similarity)
	.bind(i64::from(limit))
	.fetch_all(pool)
	.await?;

	Ok(into_hits(rows))
}

pub async fn exact_lookup(
	pool: &PgPool,
	phrase: &str,
	limit: u32,
	scope: &LookupScope,
) -> Result<Vec<LookupHit>> {
	let needle = text::fold(phrase.trim());

	if needle.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<(String, f32)> = sqlx::query_as(
		"\
SELECT item_id, raw_score
FROM (
	SELECT
		item_id,
		(CASE
			WHEN lower(normalize(title, NFKC)) = $1 THEN $2::real
			WHEN strpos(lower(normalize(title, NFKC)), $1) > 0 THEN $3::real
			WHEN strpos(lower(normalize(body, NFKC)), $1) > 0 THEN $4::real
			ELSE 0
		END)::real AS raw_score
	FROM catalog_items
	WHERE ($5::text IS NULL OR kind = $5)
		AND NOT EXISTS (
			SELECT 1
			FROM unnest(tags) AS tag, unnest($6::text[]) AS term
			WHERE strpos(regexp_replace(lower(normalize(tag, NFKC)), '[[:space:]]+', ' ', 'g'), term) > 0
		)
) AS scored
WHERE raw_score > 0
ORDER BY raw_score DESC, item_id ASC
LIMIT $7",
	)
	.bind(&needle)
	.bind(exact_scores::TITLE_EQUALS)
	.bind(exact_scores::TITLE_CONTAINS)
	.bind(exact_scores::BODY_CONTAINS)
	.bind(scope.kind.map(ItemKind::as_str))
	.bind(exclusion::normalize_terms(&scope.excluded_terms))
	.bind(i64::from(limit))
	.fetch_all(pool)
	.await?;

	Ok(into_hits(rows))
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidArgument("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
		})?;

		vec.push(value);
	}

	Ok(vec)
}

/// Builds an OR-joined prefix `tsquery` from folded word terms. Characters that carry `tsquery`
/// syntax are dropped; `None` when nothing searchable remains.
pub fn prefix_tsquery(terms: &[String]) -> Option<String> {
	let mut parts: Vec<String> = Vec::new();

	for term in terms {
		let cleaned: String =
			text::fold(term).chars().filter(|ch| ch.is_alphanumeric()).collect();

		if cleaned.is_empty()
			|| parts.iter().any(|part| part.strip_suffix(":*") == Some(cleaned.as_str()))
		{
			continue;
		}

		parts.push(format!("{cleaned}:*"));
	}

	if parts.is_empty() { None } else { Some(parts.join(" | ")) }
}

fn row_to_item(row: CatalogItemRow) -> Result<Item> {
	let kind = ItemKind::parse(&row.kind)
		.ok_or_else(|| Error::InvalidArgument(format!("Unknown item kind {:?}.", row.kind)))?;
	let metadata = match row.metadata {
		Value::Object(map) => map,
		_ => Default::default(),
	};
	let embedding = row.embedding_text.as_deref().map(parse_pg_vector).transpose()?;

	Ok(Item {
		id: row.item_id,
		kind,
		title: row.title,
		body: row.body,
		embedding,
		tags: row.tags,
		metadata,
	})
}

fn into_hits(rows: Vec<(String, f32)>) -> Vec<LookupHit> {
	rows.into_iter().map(|(item_id, raw_score)| LookupHit { item_id, raw_score }).collect()
}

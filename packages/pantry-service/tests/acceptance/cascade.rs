use std::{collections::HashMap, sync::Arc};

use pantry_service::{SearchRequest, Source, Strategy, Tier};
use pantry_storage::models::ItemKind;
use pantry_testkit::spy::{Operation, SpyCatalog};

use super::{SpyEmbedding, engine, ids, sample_engine, sample_store, search};

#[tokio::test]
async fn exact_title_match_stops_the_cascade() {
	let store = SpyCatalog::new(sample_store()).into_arc();
	let embedding = Arc::new(SpyEmbedding::default());
	let engine = engine(pantry_testkit::config::test_config(), store.clone(), embedding.clone());
	let result = search(&engine, "seafood kalguksu").await;

	assert_eq!(result.strategy_used, Strategy::Exact);
	assert_eq!(ids(&result), vec!["r-seafood-kalguksu"]);
	assert_eq!(result.candidates[0].tier, Tier::Exact);
	assert_eq!(result.message, "Found 1 result via exact match.");
	assert!(result.degraded.is_empty());
	assert_eq!(store.calls(Operation::ExactLookup), 1);
	assert_eq!(store.calls(Operation::FuzzyLookup), 0);
	assert_eq!(store.calls(Operation::FullTextLookup), 0);
	assert_eq!(store.calls(Operation::VectorLookup), 0);
	assert_eq!(embedding.calls(), 0);
}

#[tokio::test]
async fn korean_particles_and_filler_do_not_block_exact_match() {
	let result = search(&sample_engine(), "해물 칼국수를 추천해줘").await;

	assert_eq!(result.strategy_used, Strategy::Exact);
	assert_eq!(ids(&result)[0], "r-haemul-kalguksu");
}

#[tokio::test]
async fn typo_falls_through_to_partial_tier() {
	let store = SpyCatalog::new(sample_store()).into_arc();
	let embedding = Arc::new(SpyEmbedding::default());
	let engine = engine(pantry_testkit::config::test_config(), store.clone(), embedding.clone());
	let result = search(&engine, "seafod kalguksu").await;

	assert_eq!(result.strategy_used, Strategy::Partial);
	assert!(ids(&result).iter().take(3).any(|id| *id == "r-seafood-kalguksu"));
	assert!(result.candidates.iter().all(|candidate| candidate.tier == Tier::Partial));
	assert!(result.message.ends_with("via partial match."));
	assert_eq!(store.calls(Operation::VectorLookup), 0);
	assert_eq!(embedding.calls(), 0);
}

#[tokio::test]
async fn vague_query_is_answered_by_the_hybrid_blend() {
	let embedding = Arc::new(SpyEmbedding::default());
	let engine = engine(
		pantry_testkit::config::test_config(),
		Arc::new(sample_store()),
		embedding.clone(),
	);
	let result = search(&engine, "something warming and cozy").await;

	assert_eq!(result.strategy_used, Strategy::Hybrid);
	assert_eq!(ids(&result)[0], "r-clam-soup");
	assert!(result.candidates.iter().all(|candidate| {
		candidate.source_score(Source::Vector) > 0.0
			&& candidate.source_score(Source::Lexical) == 0.0
			&& candidate.tier == Tier::Hybrid
	}));
	assert_eq!(embedding.calls(), 1);
}

#[tokio::test]
async fn kind_restriction_is_applied_in_every_tier() {
	let result = sample_engine()
		.search(SearchRequest {
			query: "kalguksu".to_string(),
			excluded_terms: Vec::new(),
			limit: Some(10),
			hints: HashMap::new(),
			kind: Some(ItemKind::Venue),
		})
		.await
		.expect("Search failed.");

	assert_eq!(result.strategy_used, Strategy::Exact);
	assert_eq!(ids(&result), vec!["v-kalguksu-house"]);
}

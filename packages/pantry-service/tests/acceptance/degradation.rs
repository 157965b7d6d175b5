use std::{sync::Arc, time::Duration};

use pantry_service::{Source, Strategy};
use pantry_testkit::spy::{Fault, Operation, SpyCatalog};

use super::{FailingEmbedding, SpyEmbedding, engine, ids, sample_store, search};

#[tokio::test]
async fn embedding_failure_degrades_vector_source_only() {
	let engine = engine(
		pantry_testkit::config::test_config(),
		Arc::new(sample_store()),
		Arc::new(FailingEmbedding),
	);
	let result = search(&engine, "something warming and cozy").await;

	assert_eq!(result.strategy_used, Strategy::None);
	assert!(result.candidates.is_empty());
	assert_eq!(result.degraded, vec![Source::Vector]);
	assert_eq!(
		result.message,
		"No results found after exact, partial, and hybrid search. Degraded sources: vector."
	);
}

#[tokio::test]
async fn embedding_failure_does_not_affect_earlier_tiers() {
	let engine = engine(
		pantry_testkit::config::test_config(),
		Arc::new(sample_store()),
		Arc::new(FailingEmbedding),
	);
	let result = search(&engine, "seafood kalguksu").await;

	assert_eq!(result.strategy_used, Strategy::Exact);
	assert!(result.degraded.is_empty());
}

#[tokio::test]
async fn slow_vector_lookup_times_out_and_degrades() {
	let mut cfg = pantry_testkit::config::test_config();

	cfg.search.store_timeout_ms = 50;

	let store = SpyCatalog::new(sample_store())
		.with_fault(Operation::VectorLookup, Fault::Delay(Duration::from_millis(500)))
		.into_arc();
	let engine = engine(cfg, store.clone(), Arc::new(SpyEmbedding::default()));
	let result = search(&engine, "something warming and cozy").await;

	assert_eq!(result.strategy_used, Strategy::None);
	assert_eq!(result.degraded, vec![Source::Vector]);
	assert_eq!(store.calls(Operation::VectorLookup), 1);
}

#[tokio::test]
async fn failed_full_text_lookup_still_allows_partial_matches() {
	let store = SpyCatalog::new(sample_store())
		.with_fault(Operation::FullTextLookup, Fault::Fail)
		.into_arc();
	let engine = engine(
		pantry_testkit::config::test_config(),
		store.clone(),
		Arc::new(SpyEmbedding::default()),
	);
	let result = search(&engine, "seafod kalguksu").await;

	assert_eq!(result.strategy_used, Strategy::Partial);
	assert_eq!(ids(&result)[0], "r-seafood-kalguksu");
	assert_eq!(result.degraded, vec![Source::Lexical]);
	assert!(result.message.ends_with("Degraded sources: lexical."));
}

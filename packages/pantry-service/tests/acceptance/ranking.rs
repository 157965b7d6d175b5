use std::collections::HashSet;

use pantry_service::{Error, SearchRequest};

use super::{ids, sample_engine, search};

const QUERIES: &[&str] =
	&["seafood kalguksu", "seafod kalguksu", "something warming and cozy", "egg", "stew"];

#[tokio::test]
async fn repeated_searches_are_identical() {
	let engine = sample_engine();

	for query in QUERIES {
		let first = search(&engine, query).await;
		let second = search(&engine, query).await;
		let first_scores: Vec<f32> =
			first.candidates.iter().map(|candidate| candidate.fused_score).collect();
		let second_scores: Vec<f32> =
			second.candidates.iter().map(|candidate| candidate.fused_score).collect();

		assert_eq!(ids(&first), ids(&second), "Order changed for {query:?}.");
		assert_eq!(first_scores, second_scores, "Scores changed for {query:?}.");
		assert_eq!(first.strategy_used, second.strategy_used);
		assert_ne!(first.request_id, second.request_id);
	}
}

#[tokio::test]
async fn candidates_are_unique_scored_and_descending() {
	let engine = sample_engine();

	for query in QUERIES {
		let result = search(&engine, query).await;
		let unique: HashSet<&str> = ids(&result).into_iter().collect();

		assert_eq!(unique.len(), result.candidates.len(), "Duplicate ids for {query:?}.");
		assert!(
			result.candidates.windows(2).all(|pair| pair[0].fused_score >= pair[1].fused_score),
			"Scores not descending for {query:?}."
		);
		assert!(result.candidates.iter().all(|candidate| {
			candidate.fused_score > 0.0
				&& candidate.source_scores.values().any(|score| *score > 0.0)
		}));
	}
}

#[tokio::test]
async fn limit_caps_the_result_count() {
	let result = sample_engine()
		.search_text("something warming and cozy", &[], 1, Default::default())
		.await
		.expect("Search failed.");

	assert_eq!(result.candidates.len(), 1);
	assert_eq!(result.message, "Found 1 result via hybrid blend.");
}

#[tokio::test]
async fn zero_limit_is_rejected() {
	let err = sample_engine()
		.search(SearchRequest { query: "egg".to_string(), limit: Some(0), ..Default::default() })
		.await
		.expect_err("Expected invalid query.");

	assert!(matches!(err, Error::InvalidQuery { .. }), "Unexpected error: {err}");
}

#[tokio::test]
async fn query_without_letters_or_digits_is_rejected() {
	let err = sample_engine()
		.search(SearchRequest { query: " ... ".to_string(), ..Default::default() })
		.await
		.expect_err("Expected invalid query.");

	assert!(matches!(err, Error::InvalidQuery { .. }), "Unexpected error: {err}");
}

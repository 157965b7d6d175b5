use std::{collections::HashMap, sync::Arc};

use pantry_service::{SearchRequest, Strategy};
use pantry_testkit::fixtures::ItemBuilder;

use super::{SpyEmbedding, engine, ids, sample_engine, store_of};

fn breakfast() -> HashMap<String, String> {
	HashMap::from([("meal_slot".to_string(), "breakfast".to_string())])
}

#[tokio::test]
async fn excluded_tags_never_surface() {
	let engine = sample_engine();

	for query in ["stew", "something warming and cozy", "seafod kalguksu"] {
		let result = engine
			.search_text(query, &["Pork".to_string(), "seafood".to_string()], 10, HashMap::new())
			.await
			.expect("Search failed.");

		assert!(!result.candidates.is_empty(), "Expected results for {query:?}.");
		assert!(
			result.candidates.iter().all(|candidate| {
				candidate.item.tags.iter().all(|tag| {
					let tag = tag.to_lowercase();

					!tag.contains("pork") && !tag.contains("seafood")
				})
			}),
			"Excluded item returned for {query:?}."
		);
	}
}

#[tokio::test]
async fn exclusion_removes_exact_matches_before_ranking() {
	let result = sample_engine()
		.search_text("stew", &["pork".to_string()], 10, HashMap::new())
		.await
		.expect("Search failed.");

	assert_eq!(result.strategy_used, Strategy::Exact);
	assert_eq!(ids(&result), vec!["r-soybean-stew"]);
}

#[tokio::test]
async fn everything_excluded_yields_empty_success() {
	let store = store_of(vec![
		ItemBuilder::new("pork-bbq", "Pork Belly BBQ").tags(&["pork"]).embedded().build(),
		ItemBuilder::new("bossam", "Bossam")
			.body("Boiled pork wraps.")
			.tags(&["Pork", "wrap"])
			.embedded()
			.build(),
	]);
	let engine = engine(
		pantry_testkit::config::test_config(),
		Arc::new(store),
		Arc::new(SpyEmbedding::default()),
	);
	let result = engine
		.search_text("pork", &["PORK".to_string()], 10, HashMap::new())
		.await
		.expect("Search failed.");

	assert_eq!(result.strategy_used, Strategy::None);
	assert!(result.candidates.is_empty());
	assert_eq!(result.message, "No results found after exact, partial, and hybrid search.");
}

#[tokio::test]
async fn breakfast_hint_keeps_a_single_egg_dish() {
	let engine = sample_engine();
	let hinted = engine.search_text("egg", &[], 10, breakfast()).await.expect("Search failed.");
	let plain = engine.search_text("egg", &[], 10, HashMap::new()).await.expect("Search failed.");

	assert_eq!(ids(&hinted), vec!["r-egg-toast"]);
	assert_eq!(ids(&plain), vec!["r-egg-toast", "r-steamed-egg", "r-rolled-omelet"]);
}

#[tokio::test]
async fn attribute_cap_limits_one_category() {
	let result = sample_engine()
		.search(SearchRequest { query: "noodle".to_string(), ..Default::default() })
		.await
		.expect("Search failed.");
	let noodles = result
		.candidates
		.iter()
		.filter(|candidate| {
			candidate.item.metadata.get("category").and_then(|value| value.as_str()) == Some("noodle")
		})
		.count();

	assert!(!result.candidates.is_empty());
	assert!(noodles <= 2);
}

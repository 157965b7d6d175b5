use std::{
	cmp::Ordering,
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use pantry_config::{HybridWeights, PartialWeights};
use pantry_storage::models::Item;

use crate::{
	retrieval::{RankedItem, Source},
	search::{ScoredCandidate, Tier},
};

/// One source's ranked list and the weight applied to its reciprocal rank contributions.
pub struct SourceRanking<'a> {
	pub source: Source,
	pub weight: f32,
	pub items: &'a [RankedItem],
}

/// Reciprocal rank contribution for a 1-based `rank`.
pub fn rrf(rank: u32, k: f32) -> f32 {
	if rank == 0 {
		return 0.0;
	}

	1.0 / (k + rank as f32)
}

/// Scales weights to sum to 1. Negative or non-finite weights count as zero; an all-zero set
/// stays all zero.
pub fn normalize_weights(weights: &[(Source, f32)]) -> Vec<(Source, f32)> {
	let sanitized: Vec<(Source, f32)> = weights
		.iter()
		.map(|(source, weight)| {
			(*source, if weight.is_finite() && *weight > 0.0 { *weight } else { 0.0 })
		})
		.collect();
	let total: f32 = sanitized.iter().map(|(_, weight)| weight).sum();

	if total <= 0.0 {
		return sanitized;
	}

	sanitized.into_iter().map(|(source, weight)| (source, weight / total)).collect()
}

/// Partial tier weights, normalized to sum to 1.
pub fn partial_weights(weights: &PartialWeights) -> [(Source, f32); 2] {
	let normalized =
		normalize_weights(&[(Source::Fuzzy, weights.fuzzy), (Source::Lexical, weights.lexical)]);

	[normalized[0], normalized[1]]
}

/// Hybrid tier weights. Vector and lexical are normalized to sum to 1 so their configured ratio is
/// the effective one; fuzzy is a supplementary weight applied as configured.
pub fn hybrid_weights(weights: &HybridWeights) -> [(Source, f32); 3] {
	let normalized =
		normalize_weights(&[(Source::Vector, weights.vector), (Source::Lexical, weights.lexical)]);
	let fuzzy = if weights.fuzzy.is_finite() && weights.fuzzy > 0.0 { weights.fuzzy } else { 0.0 };

	[normalized[0], normalized[1], (Source::Fuzzy, fuzzy)]
}

/// Weighted Reciprocal Rank Fusion. Weights are applied as given; see [`partial_weights`] and
/// [`hybrid_weights`] for how configured weights are resolved.
///
/// Items are merged by id first: each source keeps its best rank and maximum raw score for the
/// item. Output is sorted by fused score descending, then by the number of contributing sources
/// descending, then by id ascending. Items that only appear in zero-weight sources are dropped.
pub fn fuse(rankings: &[SourceRanking<'_>], rrf_k: f32, tier: Tier) -> Vec<ScoredCandidate> {
	struct Merged {
		item: Arc<Item>,
		ranks: BTreeMap<Source, u32>,
		scores: BTreeMap<Source, f32>,
	}

	let weights: HashMap<Source, f32> = rankings
		.iter()
		.map(|ranking| {
			let weight = ranking.weight;

			(ranking.source, if weight.is_finite() && weight > 0.0 { weight } else { 0.0 })
		})
		.collect();
	let mut by_id: HashMap<&str, Merged> = HashMap::new();

	for ranking in rankings {
		for (idx, ranked) in ranking.items.iter().enumerate() {
			let rank = idx as u32 + 1;
			let merged = by_id.entry(ranked.item.id.as_str()).or_insert_with(|| Merged {
				item: ranked.item.clone(),
				ranks: BTreeMap::new(),
				scores: BTreeMap::new(),
			});
			let best_rank = merged.ranks.entry(ranking.source).or_insert(rank);

			*best_rank = (*best_rank).min(rank);

			let best_score = merged.scores.entry(ranking.source).or_insert(ranked.score);

			*best_score = best_score.max(ranked.score);
		}
	}

	let mut out: Vec<ScoredCandidate> = by_id
		.into_values()
		.filter_map(|merged| {
			let fused_score: f32 = merged
				.ranks
				.iter()
				.map(|(source, rank)| {
					weights.get(source).copied().unwrap_or(0.0) * rrf(*rank, rrf_k)
				})
				.sum();

			(fused_score.is_finite() && fused_score > 0.0).then(|| ScoredCandidate {
				item: merged.item,
				source_scores: merged.scores,
				fused_score,
				tier,
			})
		})
		.collect();

	sort_candidates(&mut out);

	out
}

pub(crate) fn sort_candidates(candidates: &mut [ScoredCandidate]) {
	candidates.sort_by(|left, right| {
		cmp_f32_desc(left.fused_score, right.fused_score)
			.then_with(|| right.source_scores.len().cmp(&left.source_scores.len()))
			.then_with(|| left.item.id.cmp(&right.item.id))
	});
}

pub(crate) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use pantry_testkit::fixtures::ItemBuilder;

	use super::*;

	fn ranked(id: &str, score: f32) -> RankedItem {
		RankedItem { item: Arc::new(ItemBuilder::new(id, id).build()), score }
	}

	fn ids(candidates: &[ScoredCandidate]) -> Vec<&str> {
		candidates.iter().map(|candidate| candidate.item.id.as_str()).collect()
	}

	#[test]
	fn single_first_rank_scores_reciprocal_of_k_plus_one() {
		let items = vec![ranked("a", 0.9)];
		let fused = fuse(
			&[SourceRanking { source: Source::Lexical, weight: 1.0, items: &items }],
			60.0,
			Tier::Hybrid,
		);

		assert_eq!(fused.len(), 1);
		assert!((fused[0].fused_score - 1.0 / 61.0).abs() < 1e-7);
		assert_eq!(fused[0].source_score(Source::Lexical), 0.9);
		assert_eq!(fused[0].source_score(Source::Vector), 0.0);
	}

	#[test]
	fn agreement_across_sources_beats_a_single_top_rank() {
		let lexical = vec![ranked("a", 0.9), ranked("b", 0.8)];
		let vector = vec![ranked("c", 0.7), ranked("b", 0.6)];
		let fused = fuse(
			&[
				SourceRanking { source: Source::Lexical, weight: 0.5, items: &lexical },
				SourceRanking { source: Source::Vector, weight: 0.5, items: &vector },
			],
			60.0,
			Tier::Hybrid,
		);

		assert_eq!(ids(&fused), vec!["b", "a", "c"]);
		assert_eq!(fused[0].source_scores.len(), 2);
	}

	#[test]
	fn zero_weight_sources_contribute_nothing() {
		let lexical = vec![ranked("a", 0.9)];
		let fuzzy = vec![ranked("b", 1.0), ranked("a", 0.5)];
		let fused = fuse(
			&[
				SourceRanking { source: Source::Lexical, weight: 1.0, items: &lexical },
				SourceRanking { source: Source::Fuzzy, weight: 0.0, items: &fuzzy },
			],
			60.0,
			Tier::Partial,
		);

		assert_eq!(ids(&fused), vec!["a"]);
		assert_eq!(fused[0].source_score(Source::Fuzzy), 0.5);
	}

	#[test]
	fn duplicates_keep_best_rank_and_max_score() {
		let lexical = vec![ranked("a", 0.4), ranked("b", 0.3), ranked("a", 0.8)];
		let fused = fuse(
			&[SourceRanking { source: Source::Lexical, weight: 1.0, items: &lexical }],
			60.0,
			Tier::Hybrid,
		);

		assert_eq!(ids(&fused), vec!["a", "b"]);
		assert!((fused[0].fused_score - 1.0 / 61.0).abs() < 1e-7);
		assert_eq!(fused[0].source_score(Source::Lexical), 0.8);
	}

	#[test]
	fn ties_break_by_source_count_then_id() {
		let lexical = vec![ranked("b", 0.5)];
		let fuzzy = vec![ranked("a", 0.5)];
		let fused = fuse(
			&[
				SourceRanking { source: Source::Lexical, weight: 1.0, items: &lexical },
				SourceRanking { source: Source::Fuzzy, weight: 1.0, items: &fuzzy },
			],
			60.0,
			Tier::Partial,
		);

		assert_eq!(ids(&fused), vec!["a", "b"]);
		assert_eq!(fused[0].fused_score, fused[1].fused_score);
	}

	#[test]
	fn default_hybrid_weights_keep_vector_and_lexical_at_their_configured_values() {
		let weights = hybrid_weights(&HybridWeights::default());

		assert_eq!(weights[0].0, Source::Vector);
		assert!((weights[0].1 - 0.6).abs() < 1e-6);
		assert!((weights[1].1 - 0.4).abs() < 1e-6);
		assert!((weights[2].1 - 0.2).abs() < 1e-6);
	}

	#[test]
	fn single_source_item_scores_its_weight_times_rrf_at_default_hybrid_weights() {
		let vector = vec![ranked("a", 0.9)];
		let empty: Vec<RankedItem> = Vec::new();
		let rankings: Vec<SourceRanking<'_>> = hybrid_weights(&HybridWeights::default())
			.into_iter()
			.map(|(source, weight)| SourceRanking {
				source,
				weight,
				items: if source == Source::Vector { vector.as_slice() } else { empty.as_slice() },
			})
			.collect();
		let fused = fuse(&rankings, 60.0, Tier::Hybrid);

		assert_eq!(ids(&fused), vec!["a"]);
		assert!((fused[0].fused_score - 0.6 / 61.0).abs() < 1e-7);
	}

	#[test]
	fn hybrid_weights_renormalize_vector_and_lexical_only() {
		let weights = hybrid_weights(&HybridWeights { vector: 3.0, lexical: 1.0, fuzzy: 0.5 });

		assert!((weights[0].1 - 0.75).abs() < 1e-6);
		assert!((weights[1].1 - 0.25).abs() < 1e-6);
		assert!((weights[2].1 - 0.5).abs() < 1e-6);
	}

	#[test]
	fn partial_weights_sum_to_one() {
		let weights = partial_weights(&PartialWeights { lexical: 1.0, fuzzy: 3.0 });

		assert_eq!(weights[0].0, Source::Fuzzy);
		assert!((weights[0].1 - 0.75).abs() < 1e-6);
		assert!((weights[1].1 - 0.25).abs() < 1e-6);
	}

	#[test]
	fn rank_zero_contributes_nothing() {
		assert_eq!(rrf(0, 60.0), 0.0);
		assert!(rrf(1, 60.0) > rrf(2, 60.0));
	}
}

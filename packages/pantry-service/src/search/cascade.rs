use std::collections::BTreeSet;

use pantry_config::Search;

use crate::{
	Result,
	query::Query,
	retrieval::{Retrieved, Retriever, Retrievers, Source},
	search::{
		ScoredCandidate, Strategy, Tier,
		fusion::{self, SourceRanking},
	},
};

/// Position in the tier cascade. Every state is entered at most once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
	ExactMatch,
	PartialMatch,
	HybridBlend,
	Exhausted,
}
impl CascadeState {
	pub fn tier(self) -> Option<Tier> {
		match self {
			Self::ExactMatch => Some(Tier::Exact),
			Self::PartialMatch => Some(Tier::Partial),
			Self::HybridBlend => Some(Tier::Hybrid),
			Self::Exhausted => None,
		}
	}

	/// `produced` is whether the current tier met its success condition.
	pub fn transition(self, produced: bool) -> Transition {
		match (self, produced) {
			(Self::ExactMatch, true) => Transition::Finish(Strategy::Exact),
			(Self::ExactMatch, false) => Transition::Advance(Self::PartialMatch),
			(Self::PartialMatch, true) => Transition::Finish(Strategy::Partial),
			(Self::PartialMatch, false) => Transition::Advance(Self::HybridBlend),
			(Self::HybridBlend, true) => Transition::Finish(Strategy::Hybrid),
			(Self::HybridBlend, false) => Transition::Advance(Self::Exhausted),
			(Self::Exhausted, _) => Transition::Finish(Strategy::None),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	Finish(Strategy),
	Advance(CascadeState),
}

pub(crate) struct CascadeOutcome {
	pub(crate) strategy: Strategy,
	pub(crate) candidates: Vec<ScoredCandidate>,
	pub(crate) degraded: BTreeSet<Source>,
}

/// Runs tiers in order and stops at the first one that produces candidates. Retriever failures
/// are recorded as degraded sources and treated as empty results.
pub(crate) async fn run(
	retrievers: &Retrievers,
	cfg: &Search,
	query: &Query,
	k: u32,
) -> CascadeOutcome {
	let mut state = CascadeState::ExactMatch;
	let mut degraded = BTreeSet::new();

	loop {
		let candidates = match state.tier() {
			Some(tier) => {
				let candidates = run_tier(tier, retrievers, cfg, query, k, &mut degraded).await;

				tracing::debug!(tier = tier.as_str(), candidates = candidates.len(), "Tier finished.");

				candidates
			},
			None => Vec::new(),
		};

		match state.transition(!candidates.is_empty()) {
			Transition::Finish(strategy) => return CascadeOutcome { strategy, candidates, degraded },
			Transition::Advance(next) => state = next,
		}
	}
}

async fn run_tier(
	tier: Tier,
	retrievers: &Retrievers,
	cfg: &Search,
	query: &Query,
	k: u32,
	degraded: &mut BTreeSet<Source>,
) -> Vec<ScoredCandidate> {
	match tier {
		Tier::Exact => {
			let exact = settle(
				retrievers.exact.as_ref(),
				retrievers.exact.retrieve(query, k).await,
				degraded,
			);

			exact_candidates(exact, cfg.exact.boost)
		},
		Tier::Partial => {
			let (fuzzy, lexical) = tokio::join!(
				retrievers.fuzzy.retrieve(query, k),
				retrievers.lexical.retrieve(query, k),
			);
			let fuzzy = settle(retrievers.fuzzy.as_ref(), fuzzy, degraded);
			let lexical = settle(retrievers.lexical.as_ref(), lexical, degraded);

			// Weak lexical matches alone are not enough to stop the cascade.
			if fuzzy.is_empty() && !lexical.confident {
				return Vec::new();
			}

			let [(_, fuzzy_weight), (_, lexical_weight)] =
				fusion::partial_weights(&cfg.fusion.partial);

			fusion::fuse(
				&[
					SourceRanking {
						source: retrievers.fuzzy.source(),
						weight: fuzzy_weight,
						items: &fuzzy.items,
					},
					SourceRanking {
						source: retrievers.lexical.source(),
						weight: lexical_weight,
						items: &lexical.items,
					},
				],
				cfg.fusion.rrf_k,
				Tier::Partial,
			)
		},
		Tier::Hybrid => {
			let (vector, lexical, fuzzy) = tokio::join!(
				retrievers.vector.retrieve(query, k),
				retrievers.lexical.retrieve(query, k),
				retrievers.fuzzy.retrieve(query, k),
			);
			let vector = settle(retrievers.vector.as_ref(), vector, degraded);
			let lexical = settle(retrievers.lexical.as_ref(), lexical, degraded);
			let fuzzy = settle(retrievers.fuzzy.as_ref(), fuzzy, degraded);
			let [(_, vector_weight), (_, lexical_weight), (_, fuzzy_weight)] =
				fusion::hybrid_weights(&cfg.fusion.hybrid);

			fusion::fuse(
				&[
					SourceRanking {
						source: retrievers.vector.source(),
						weight: vector_weight,
						items: &vector.items,
					},
					SourceRanking {
						source: retrievers.lexical.source(),
						weight: lexical_weight,
						items: &lexical.items,
					},
					SourceRanking {
						source: retrievers.fuzzy.source(),
						weight: fuzzy_weight,
						items: &fuzzy.items,
					},
				],
				cfg.fusion.rrf_k,
				Tier::Hybrid,
			)
		},
	}
}

fn settle(
	retriever: &dyn Retriever,
	result: Result<Retrieved>,
	degraded: &mut BTreeSet<Source>,
) -> Retrieved {
	match result {
		Ok(retrieved) => retrieved,
		Err(err) => {
			let source = retriever.source();

			tracing::warn!(
				source = source.as_str(),
				error = %err,
				"Retriever failed. Continuing without it."
			);

			degraded.insert(source);

			Retrieved::default()
		},
	}
}

fn exact_candidates(exact: Retrieved, boost: f32) -> Vec<ScoredCandidate> {
	let mut candidates: Vec<ScoredCandidate> = exact
		.items
		.into_iter()
		.filter_map(|ranked| {
			let fused_score = ranked.score * boost;

			(fused_score.is_finite() && fused_score > 0.0).then(|| ScoredCandidate {
				item: ranked.item,
				source_scores: [(Source::Exact, ranked.score)].into_iter().collect(),
				fused_score,
				tier: Tier::Exact,
			})
		})
		.collect();

	fusion::sort_candidates(&mut candidates);

	candidates
}

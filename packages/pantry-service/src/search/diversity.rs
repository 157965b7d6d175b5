use std::collections::HashMap;

use pantry_config::{SearchDiversity, SlotQuota};
use pantry_domain::{exclusion, text};
use pantry_storage::models::Item;

use crate::search::ScoredCandidate;

/// The attribute used for per-attribute caps: the configured metadata string when present, else
/// the first tag, folded.
pub fn dominant_attribute(item: &Item, attribute_key: Option<&str>) -> Option<String> {
	if let Some(key) = attribute_key
		&& let Some(value) = item.metadata.get(key).and_then(|value| value.as_str())
		&& !value.trim().is_empty()
	{
		return Some(text::fold(value.trim()));
	}

	item.dominant_tag().map(|tag| text::fold(tag.trim())).filter(|tag| !tag.is_empty())
}

/// Greedy re-ranking pass over candidates already in descending score order.
///
/// A candidate is skipped when its attribute already filled `per_attribute_cap` slots, or when
/// it belongs to an enforced slot quota that is already full. Quotas apply only when the request
/// hints select their slot and more than `max` candidates match them. The relative order of the
/// kept candidates is unchanged.
pub fn select_diverse(
	candidates: Vec<ScoredCandidate>,
	cfg: &SearchDiversity,
	hints: &HashMap<String, String>,
	limit: usize,
) -> Vec<ScoredCandidate> {
	if !cfg.enabled {
		let mut candidates = candidates;

		candidates.truncate(limit);

		return candidates;
	}

	let quotas = enforced_quotas(&candidates, cfg, hints);
	let mut attribute_counts: HashMap<String, u32> = HashMap::new();
	let mut quota_counts = vec![0_u32; quotas.len()];
	let mut out = Vec::with_capacity(limit.min(candidates.len()));

	for candidate in candidates {
		if out.len() >= limit {
			break;
		}

		let attribute = dominant_attribute(&candidate.item, cfg.attribute_key.as_deref());

		if cfg.per_attribute_cap > 0
			&& let Some(attribute) = attribute.as_ref()
			&& attribute_counts.get(attribute).copied().unwrap_or(0) >= cfg.per_attribute_cap
		{
			tracing::trace!(item_id = %candidate.item.id, attribute, "Skipped by attribute cap.");

			continue;
		}

		let matched: Vec<usize> = quotas
			.iter()
			.enumerate()
			.filter(|(_, quota)| exclusion::is_excluded(&candidate.item.tags, &quota.terms))
			.map(|(idx, _)| idx)
			.collect();

		if matched.iter().any(|idx| quota_counts[*idx] >= quotas[*idx].max) {
			tracing::trace!(item_id = %candidate.item.id, "Skipped by slot quota.");

			continue;
		}

		for idx in matched {
			quota_counts[idx] += 1;
		}
		if let Some(attribute) = attribute {
			*attribute_counts.entry(attribute).or_default() += 1;
		}

		out.push(candidate);
	}

	out
}

struct ActiveQuota {
	terms: Vec<String>,
	max: u32,
}

fn enforced_quotas(
	candidates: &[ScoredCandidate],
	cfg: &SearchDiversity,
	hints: &HashMap<String, String>,
) -> Vec<ActiveQuota> {
	let Some(slot) = hint_value(hints, &cfg.slot_hint_key) else {
		return Vec::new();
	};

	cfg.slot_quotas
		.iter()
		.filter(|quota| quota_selected(quota, slot))
		.filter_map(|quota| {
			let terms = exclusion::normalize_terms(&quota.terms);

			if terms.is_empty() {
				return None;
			}

			let matching = candidates
				.iter()
				.filter(|candidate| exclusion::is_excluded(&candidate.item.tags, &terms))
				.count();

			(matching > quota.max as usize).then_some(ActiveQuota { terms, max: quota.max })
		})
		.collect()
}

fn hint_value<'a>(hints: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
	hints
		.iter()
		.find(|(hint_key, _)| hint_key.trim().eq_ignore_ascii_case(key.trim()))
		.map(|(_, value)| value.trim())
		.filter(|value| !value.is_empty())
}

fn quota_selected(quota: &SlotQuota, slot: &str) -> bool {
	text::fold(quota.slot.trim()) == text::fold(slot)
}

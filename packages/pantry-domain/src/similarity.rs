use std::collections::HashSet;

use crate::text;

type Trigram = (char, char, char);

/// Cosine similarity in `[-1, 1]`. Zero when either vector has no magnitude or the lengths differ.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> f32 {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm == 0.0 || rhs_norm == 0.0 {
		return 0.0;
	}

	let similarity = dot / (lhs_norm.sqrt() * rhs_norm.sqrt());

	if similarity.is_finite() { similarity.clamp(-1.0, 1.0) } else { 0.0 }
}

/// pg_trgm style trigram set: each alphanumeric word is padded with two leading spaces and one
/// trailing space before extracting three-character windows.
pub fn trigrams(input: &str) -> HashSet<Trigram> {
	let folded = text::fold(input);
	let mut out = HashSet::new();

	for word in folded.split(|ch: char| !ch.is_alphanumeric()) {
		if word.is_empty() {
			continue;
		}

		let mut padded = Vec::with_capacity(word.len() + 3);

		padded.extend([' ', ' ']);
		padded.extend(word.chars());
		padded.push(' ');

		for window in padded.windows(3) {
			out.insert((window[0], window[1], window[2]));
		}
	}

	out
}

/// Jaccard similarity of the two trigram sets, in `[0, 1]`.
pub fn trigram_similarity(lhs: &str, rhs: &str) -> f32 {
	let lhs = trigrams(lhs);
	let rhs = trigrams(rhs);

	if lhs.is_empty() || rhs.is_empty() {
		return 0.0;
	}

	let shared = lhs.intersection(&rhs).count();
	let union = lhs.len() + rhs.len() - shared;

	if union == 0 { 0.0 } else { shared as f32 / union as f32 }
}

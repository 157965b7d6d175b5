//! Deterministic embedding fake for tests and offline evaluation.

use pantry_domain::text;

/// Concept groups sharing one axis each. Any token starting with a group word activates the axis,
/// so related words embed close together without sharing surface text.
const CONCEPTS: &[&[&str]] = &[
	&["soup", "broth", "국물", "warming", "comfort", "hearty", "cozy"],
	&["noodle", "kalguksu", "국수", "칼국수", "ramen", "udon"],
	&["seafood", "clam", "shrimp", "해물", "해산물", "ocean", "fish"],
	&["spicy", "kimchi", "김치", "chili", "gochujang", "fiery"],
	&["egg", "계란", "달걀", "omelet", "scrambled"],
	&["breakfast", "morning", "brunch", "아침"],
	&["sweet", "dessert", "cake", "chocolate", "sugar"],
	&["vegetable", "vegan", "salad", "greens", "채소", "비건"],
	&["pork", "돼지", "bacon", "belly"],
	&["tofu", "두부", "bean", "soy"],
];
const HASHED_DIMENSIONS: usize = 6;

/// Bag-of-words embedder: concept axes plus a few hashed buckets for everything else.
#[derive(Clone, Debug, Default)]
pub struct BagOfWordsEmbedder;
impl BagOfWordsEmbedder {
	pub const DIMENSIONS: u32 = (CONCEPTS.len() + HASHED_DIMENSIONS) as u32;

	pub fn embed_text(&self, input: &str) -> Vec<f32> {
		let mut vec = vec![0.0_f32; Self::DIMENSIONS as usize];

		for token in text::tokenize(input) {
			let concept = CONCEPTS
				.iter()
				.position(|group| group.iter().any(|word| token.starts_with(word)));

			match concept {
				Some(axis) => vec[axis] += 1.0,
				None => {
					let hash = blake3::hash(token.as_bytes());
					let bucket = hash.as_bytes()[0] as usize % HASHED_DIMENSIONS;

					vec[CONCEPTS.len() + bucket] += 0.25;
				},
			}
		}

		normalize(vec)
	}

	pub fn embed_all(&self, texts: &[String]) -> Vec<Vec<f32>> {
		texts.iter().map(|text| self.embed_text(text)).collect()
	}
}

fn normalize(mut vec: Vec<f32>) -> Vec<f32> {
	let norm = vec.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut vec {
			*value /= norm;
		}
	}

	vec
}

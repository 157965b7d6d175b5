use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

pub fn nfkc(input: &str) -> String {
	input.nfkc().collect()
}

/// Canonical matching form: NFKC, then lowercase.
pub fn fold(input: &str) -> String {
	nfkc(input).to_lowercase()
}

pub fn collapse_whitespace(input: &str) -> String {
	let mut out = String::with_capacity(input.len());

	for word in input.split_whitespace() {
		if !out.is_empty() {
			out.push(' ');
		}

		out.push_str(word);
	}

	out
}

/// Folded form with whitespace runs collapsed to single spaces and trimmed.
pub fn fold_phrase(input: &str) -> String {
	collapse_whitespace(&fold(input))
}

/// Folds the input and splits it on Unicode word boundaries.
pub fn tokenize(input: &str) -> Vec<String> {
	fold(input).unicode_words().map(str::to_string).collect()
}

pub fn char_len(input: &str) -> usize {
	input.chars().count()
}

pub fn contains_hangul(input: &str) -> bool {
	input.chars().any(|ch| ch.script() == Script::Hangul)
}

/// Removes one trailing particle from a Hangul token.
///
/// The stem must keep at least two characters, so short nouns that happen to end with a particle
/// syllable are left intact. Non-Hangul tokens are returned unchanged.
pub fn strip_particle<'a>(token: &'a str, particles: &[&str]) -> &'a str {
	if !contains_hangul(token) {
		return token;
	}

	for particle in particles {
		let Some(stem) = token.strip_suffix(particle) else {
			continue;
		};

		if char_len(stem) >= 2 {
			return stem;
		}
	}

	token
}

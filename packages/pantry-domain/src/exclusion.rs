use crate::text;

/// Folds exclusion terms, dropping blanks and duplicates while keeping the first occurrence order.
pub fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut out: Vec<String> = Vec::new();

	for term in terms {
		let folded = text::fold_phrase(term.as_ref());

		if folded.is_empty() || out.contains(&folded) {
			continue;
		}

		out.push(folded);
	}

	out
}

/// True when any tag, folded like the terms, contains any exclusion term as a substring.
///
/// `excluded_terms` must already be normalized with [`normalize_terms`].
pub fn is_excluded<S>(tags: &[S], excluded_terms: &[String]) -> bool
where
	S: AsRef<str>,
{
	if excluded_terms.is_empty() {
		return false;
	}

	tags.iter().any(|tag| {
		let tag = text::fold_phrase(tag.as_ref());

		excluded_terms.iter().any(|term| tag.contains(term.as_str()))
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalize_terms_folds_and_dedupes() {
		let terms = normalize_terms(["  Cilantro ", "cilantro", "", "ＰＯＲＫ"]);

		assert_eq!(terms, vec!["cilantro".to_string(), "pork".to_string()]);
	}

	#[test]
	fn exclusion_matches_tag_substrings() {
		let excluded = normalize_terms(["pork"]);

		assert!(is_excluded(&["Pork Belly", "stew"], &excluded));
		assert!(is_excluded(&["돼지고기", "porkchop"], &excluded));
		assert!(!is_excluded(&["beef"], &excluded));
	}

	#[test]
	fn tags_and_terms_collapse_whitespace_the_same_way() {
		let excluded = normalize_terms(["pork  belly"]);

		assert_eq!(excluded, vec!["pork belly".to_string()]);
		assert!(is_excluded(&["Pork  Belly"], &excluded));
		assert!(is_excluded(&["braised pork\tbelly"], &excluded));
		assert!(is_excluded(&["Pork Belly"], &normalize_terms(["pork belly"])));
	}

	#[test]
	fn empty_exclusion_list_excludes_nothing() {
		assert!(!is_excluded(&["anything"], &[]));
		assert!(!is_excluded::<&str>(&[], &normalize_terms(["pork"])));
	}
}

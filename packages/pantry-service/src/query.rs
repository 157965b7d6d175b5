use std::collections::{HashMap, HashSet};

use pantry_config::Config;
use pantry_domain::{exclusion, text, vocabulary};
use pantry_storage::{LookupScope, models::ItemKind};

use crate::{Error, Result};

/// Upper bound on fuzzy query variants regardless of configuration.
pub const MAX_VARIANTS: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryVariant {
	Text(String),
	/// Alternatives searched independently; an item keeps its best score across them.
	AnyOf(Vec<String>),
}

/// A normalized query. Built once per request and shared read-only by every tier.
#[derive(Clone, Debug)]
pub struct Query {
	pub raw: String,
	/// Core keywords, priority vocabulary first.
	pub terms: Vec<String>,
	/// Core keywords followed by synonym expansions.
	pub lexical_terms: Vec<String>,
	/// NFKC-normalized raw query with collapsed whitespace.
	pub semantic_text: String,
	pub variants: Vec<QueryVariant>,
	pub excluded_terms: Vec<String>,
	pub hints: HashMap<String, String>,
	pub kind: Option<ItemKind>,
	stripped_phrase: String,
	folded_raw: String,
}
impl Query {
	/// The stopword-stripped phrase, or the folded raw text when stripping left nothing.
	pub fn exact_phrase(&self) -> &str {
		if self.stripped_phrase.is_empty() { &self.folded_raw } else { &self.stripped_phrase }
	}

	pub fn scope(&self) -> LookupScope {
		LookupScope { excluded_terms: self.excluded_terms.clone(), kind: self.kind }
	}
}

pub struct QueryNormalizer {
	stopwords: HashSet<String>,
	priority: HashSet<String>,
	synonyms: HashMap<String, Vec<String>>,
	max_variants: usize,
	max_terms: usize,
}
impl QueryNormalizer {
	pub fn new(cfg: &Config) -> Self {
		let mut stopwords: HashSet<String> =
			vocabulary::STOPWORDS.iter().map(|word| word.to_string()).collect();

		stopwords.extend(cfg.query.extra_stopwords.iter().map(|word| text::fold(word.trim())));

		let priority = vocabulary::PRIORITY_TERMS.iter().map(|word| word.to_string()).collect();
		let mut groups: Vec<Vec<String>> = vocabulary::SYNONYM_GROUPS
			.iter()
			.map(|group| group.iter().map(|term| term.to_string()).collect())
			.collect();

		groups.extend(cfg.query.synonyms.iter().map(|group| {
			group.iter().map(|term| text::fold(term.trim())).filter(|term| !term.is_empty()).collect()
		}));

		Self {
			stopwords,
			priority,
			synonyms: build_synonym_index(&groups),
			max_variants: (cfg.search.fuzzy.max_variants as usize).clamp(1, MAX_VARIANTS),
			max_terms: cfg.search.lexical.max_terms.max(1) as usize,
		}
	}

	pub fn normalize(
		&self,
		raw: &str,
		excluded_terms: &[String],
		hints: HashMap<String, String>,
		kind: Option<ItemKind>,
	) -> Result<Query> {
		let folded_raw = text::fold_phrase(raw);
		let tokens = text::tokenize(&folded_raw);

		if tokens.is_empty() {
			return Err(Error::InvalidQuery {
				message: "Query must contain at least one letter or digit.".to_string(),
			});
		}

		let mut stripped: Vec<String> = Vec::with_capacity(tokens.len());

		for token in &tokens {
			if self.stopwords.contains(token) {
				continue;
			}

			let stem = text::strip_particle(token, vocabulary::PARTICLES);

			if self.stopwords.contains(stem) {
				continue;
			}

			stripped.push(stem.to_string());
		}

		let terms = self.core_terms(&stripped);
		let lexical_terms = self.expand_synonyms(&terms);
		let stripped_phrase = stripped.join(" ");
		let variants = self.variants(&folded_raw, &stripped_phrase, &terms);

		Ok(Query {
			raw: raw.to_string(),
			terms,
			lexical_terms,
			semantic_text: text::collapse_whitespace(&text::nfkc(raw)),
			variants,
			excluded_terms: exclusion::normalize_terms(excluded_terms),
			hints,
			kind,
			stripped_phrase,
			folded_raw,
		})
	}

	fn core_terms(&self, stripped: &[String]) -> Vec<String> {
		let mut seen = HashSet::new();
		let (priority, generic): (Vec<String>, Vec<String>) = stripped
			.iter()
			.filter(|token| text::char_len(token) >= 2 && seen.insert(token.as_str()))
			.cloned()
			.partition(|token| self.priority.contains(token));

		priority.into_iter().chain(generic).collect()
	}

	fn expand_synonyms(&self, terms: &[String]) -> Vec<String> {
		let mut out: Vec<String> = Vec::with_capacity(terms.len());
		let expansions = terms.iter().flat_map(|term| {
			self.synonyms.get(term).map(Vec::as_slice).unwrap_or_default().iter()
		});

		for term in terms.iter().chain(expansions) {
			if out.len() >= self.max_terms {
				break;
			}
			if !out.contains(term) {
				out.push(term.clone());
			}
		}

		out
	}

	fn variants(
		&self,
		folded_raw: &str,
		stripped_phrase: &str,
		terms: &[String],
	) -> Vec<QueryVariant> {
		let mut candidates = vec![
			QueryVariant::Text(folded_raw.to_string()),
			QueryVariant::Text(stripped_phrase.to_string()),
			QueryVariant::Text(terms.join(" ")),
		];

		if terms.len() >= 2 {
			candidates.push(QueryVariant::Text(terms.concat()));
			candidates.push(QueryVariant::AnyOf(terms.to_vec()));
		}

		let mut out: Vec<QueryVariant> = Vec::with_capacity(self.max_variants);

		for variant in candidates {
			if out.len() >= self.max_variants {
				break;
			}
			if matches!(&variant, QueryVariant::Text(text) if text.is_empty()) {
				continue;
			}
			if !out.contains(&variant) {
				out.push(variant);
			}
		}

		out
	}
}

fn build_synonym_index(groups: &[Vec<String>]) -> HashMap<String, Vec<String>> {
	let mut index: HashMap<String, Vec<String>> = HashMap::new();

	for group in groups {
		for term in group {
			let entry = index.entry(term.clone()).or_default();

			for other in group {
				if other != term && !entry.contains(other) {
					entry.push(other.clone());
				}
			}
		}
	}

	index
}

#[cfg(test)]
mod tests {
	use super::*;

	fn normalizer() -> QueryNormalizer {
		QueryNormalizer::new(&pantry_testkit::config::test_config())
	}

	fn normalize(raw: &str) -> Query {
		normalizer().normalize(raw, &[], HashMap::new(), None).expect("Failed to normalize query.")
	}

	#[test]
	fn strips_stopwords_and_particles_at_token_level() {
		let query = normalize("해물 칼국수를 추천해줘");

		assert_eq!(query.terms, vec!["해물".to_string(), "칼국수".to_string()]);
		assert_eq!(query.exact_phrase(), "해물 칼국수");
	}

	#[test]
	fn stopword_removal_never_corrupts_keywords() {
		// "좀" is a stopword but must not be removed from inside "좀비".
		let query = normalize("좀비 파스타 좀");

		assert_eq!(query.terms, vec!["좀비".to_string(), "파스타".to_string()]);
	}

	#[test]
	fn priority_vocabulary_is_ordered_first() {
		let query = normalize("quick weeknight tofu stew");

		assert_eq!(
			query.terms,
			vec![
				"tofu".to_string(),
				"stew".to_string(),
				"quick".to_string(),
				"weeknight".to_string()
			]
		);
	}

	#[test]
	fn synonyms_expand_lexical_terms_only() {
		let query = normalize("계란 toast");

		assert_eq!(query.terms, vec!["계란".to_string(), "toast".to_string()]);
		assert!(query.lexical_terms.contains(&"달걀".to_string()));
		assert!(query.lexical_terms.contains(&"egg".to_string()));
		assert_eq!(query.semantic_text, "계란 toast");
	}

	#[test]
	fn variants_are_ordered_deduplicated_and_capped() {
		let query = normalize("Please find seafood kalguksu");

		assert_eq!(
			query.variants,
			vec![
				QueryVariant::Text("please find seafood kalguksu".to_string()),
				QueryVariant::Text("seafood kalguksu".to_string()),
				QueryVariant::Text("seafoodkalguksu".to_string()),
				QueryVariant::AnyOf(vec!["seafood".to_string(), "kalguksu".to_string()]),
			]
		);
		assert!(query.variants.len() <= MAX_VARIANTS);
	}

	#[test]
	fn all_stopword_query_still_searches_original_text() {
		let query = normalize("추천해줘");

		assert!(query.terms.is_empty());
		assert!(query.lexical_terms.is_empty());
		assert_eq!(query.variants, vec![QueryVariant::Text("추천해줘".to_string())]);
		assert_eq!(query.exact_phrase(), "추천해줘");
	}

	#[test]
	fn empty_query_is_invalid() {
		let err = normalizer()
			.normalize("  ?! ", &[], HashMap::new(), None)
			.expect_err("Expected invalid query.");

		assert!(matches!(err, Error::InvalidQuery { .. }), "Unexpected error: {err}");
	}

	#[test]
	fn configured_stopwords_and_synonyms_apply() {
		let mut cfg = pantry_testkit::config::test_config();

		cfg.query.extra_stopwords = vec!["Tonight".to_string()];
		cfg.query.synonyms = vec![vec!["scallion".to_string(), "대파".to_string()]];

		let query = QueryNormalizer::new(&cfg)
			.normalize("scallion pancake tonight", &[], HashMap::new(), None)
			.expect("Failed to normalize query.");

		assert_eq!(query.terms, vec!["scallion".to_string(), "pancake".to_string()]);
		assert!(query.lexical_terms.contains(&"대파".to_string()));
	}

	#[test]
	fn excluded_terms_are_folded() {
		let query = normalizer()
			.normalize("stew", &["  PORK ".to_string(), String::new()], HashMap::new(), None)
			.expect("Failed to normalize query.");

		assert_eq!(query.excluded_terms, vec!["pork".to_string()]);
		assert_eq!(query.scope().excluded_terms, vec!["pork".to_string()]);
	}
}

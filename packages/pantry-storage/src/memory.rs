use std::{
	collections::{HashMap, HashSet},
	fs,
	path::Path,
	sync::Arc,
};

use pantry_domain::{exclusion, similarity, text};

use crate::{
	BoxFuture, CatalogStore, Error, LookupHit, LookupScope, Result, exact_scores, fuzzy_scores,
	models::Item, sort_hits,
};

const DEFAULT_TITLE_WEIGHT: f32 = 1.0;
const DEFAULT_BODY_WEIGHT: f32 = 0.4;

struct Entry {
	item: Arc<Item>,
	title: String,
	body: String,
	title_tokens: Vec<String>,
	body_tokens: Vec<String>,
}
impl Entry {
	fn new(item: Item) -> Self {
		let title = text::fold(&item.title);
		let body = text::fold(&item.body);
		let title_tokens = text::tokenize(&title);
		let body_tokens = text::tokenize(&body);

		Self { item: Arc::new(item), title, body, title_tokens, body_tokens }
	}

	fn in_scope(&self, scope: &LookupScope, excluded_terms: &[String]) -> bool {
		if let Some(kind) = scope.kind
			&& self.item.kind != kind
		{
			return false;
		}

		!exclusion::is_excluded(&self.item.tags, excluded_terms)
	}
}

/// In-process catalog with the same lookup semantics as the Postgres store.
pub struct MemoryCatalog {
	entries: Vec<Entry>,
	by_id: HashMap<String, usize>,
	title_weight: f32,
	body_weight: f32,
}
impl MemoryCatalog {
	pub fn from_items(items: Vec<Item>) -> Result<Self> {
		let mut entries = Vec::with_capacity(items.len());
		let mut by_id = HashMap::with_capacity(items.len());

		for item in items {
			if item.id.trim().is_empty() {
				return Err(Error::InvalidArgument("Catalog item id must be non-empty.".to_string()));
			}
			if by_id.insert(item.id.clone(), entries.len()).is_some() {
				return Err(Error::InvalidArgument(format!("Duplicate catalog item id {:?}.", item.id)));
			}

			entries.push(Entry::new(item));
		}

		Ok(Self {
			entries,
			by_id,
			title_weight: DEFAULT_TITLE_WEIGHT,
			body_weight: DEFAULT_BODY_WEIGHT,
		})
	}

	/// Reads a JSON array of items from `cfg.catalog_path`.
	pub fn load(cfg: &pantry_config::MemoryCatalog) -> Result<Self> {
		let catalog = Self::from_path(&cfg.catalog_path)?;

		Ok(catalog.with_weights(cfg.title_weight, cfg.body_weight))
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
		let items: Vec<Item> = serde_json::from_str(&raw)?;
		let catalog = Self::from_items(items)?;

		tracing::debug!(path = %path.display(), items = catalog.len(), "Loaded memory catalog.");

		Ok(catalog)
	}

	pub fn with_weights(mut self, title_weight: f32, body_weight: f32) -> Self {
		self.title_weight = title_weight;
		self.body_weight = body_weight;

		self
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> {
		self.entries.iter().map(|entry| &entry.item)
	}

	fn collect<F>(&self, scope: &LookupScope, limit: u32, mut score: F) -> Vec<LookupHit>
	where
		F: FnMut(&Entry) -> f32,
	{
		let excluded_terms = exclusion::normalize_terms(&scope.excluded_terms);
		let mut hits: Vec<LookupHit> = self
			.entries
			.iter()
			.filter(|entry| entry.in_scope(scope, &excluded_terms))
			.filter_map(|entry| {
				let raw_score = score(entry);

				(raw_score.is_finite() && raw_score > 0.0)
					.then(|| LookupHit { item_id: entry.item.id.clone(), raw_score })
			})
			.collect();

		sort_hits(&mut hits);
		hits.truncate(limit as usize);

		hits
	}

	fn full_text_score(&self, entry: &Entry, terms: &[String]) -> f32 {
		let mut score = 0.0;

		for term in terms {
			if entry.title_tokens.iter().any(|token| token.starts_with(term.as_str())) {
				score += self.title_weight;
			}
			if entry.body_tokens.iter().any(|token| token.starts_with(term.as_str())) {
				score += self.body_weight;
			}
		}

		score
	}
}
impl CatalogStore for MemoryCatalog {
	fn vector_lookup<'a>(
		&'a self,
		vector: &'a [f32],
		limit: u32,
		threshold: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			Ok(self.collect(scope, limit, |entry| {
				let Some(embedding) = entry.item.embedding.as_deref() else {
					return 0.0;
				};
				let similarity = similarity::cosine_similarity(vector, embedding);

				if similarity >= threshold { similarity } else { 0.0 }
			}))
		})
	}

	fn full_text_lookup<'a>(
		&'a self,
		terms: &'a [String],
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			let mut seen = HashSet::new();
			let terms: Vec<String> = terms
				.iter()
				.map(|term| text::fold(term.trim()))
				.filter(|term| !term.is_empty() && seen.insert(term.clone()))
				.collect();

			if terms.is_empty() {
				return Ok(Vec::new());
			}

			Ok(self.collect(scope, limit, |entry| self.full_text_score(entry, &terms)))
		})
	}

	fn fuzzy_lookup<'a>(
		&'a self,
		term: &'a str,
		limit: u32,
		min_similarity: f32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			let term = text::fold(term.trim());

			if term.is_empty() {
				return Ok(Vec::new());
			}

			Ok(self.collect(scope, limit, |entry| {
				let containment = if entry.title.contains(term.as_str()) {
					fuzzy_scores::TITLE_CONTAINS
				} else if entry.body.contains(term.as_str()) {
					fuzzy_scores::BODY_CONTAINS
				} else {
					0.0
				};
				let score = containment.max(similarity::trigram_similarity(&term, &entry.title));

				if score >= min_similarity { score } else { 0.0 }
			}))
		})
	}

	fn exact_lookup<'a>(
		&'a self,
		text: &'a str,
		limit: u32,
		scope: &'a LookupScope,
	) -> BoxFuture<'a, Result<Vec<LookupHit>>> {
		Box::pin(async move {
			let needle = text::fold(text.trim());

			if needle.is_empty() {
				return Ok(Vec::new());
			}

			Ok(self.collect(scope, limit, |entry| {
				if entry.title == needle {
					exact_scores::TITLE_EQUALS
				} else if entry.title.contains(needle.as_str()) {
					exact_scores::TITLE_CONTAINS
				} else if entry.body.contains(needle.as_str()) {
					exact_scores::BODY_CONTAINS
				} else {
					0.0
				}
			}))
		})
	}

	fn fetch_items<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<Vec<Arc<Item>>>> {
		Box::pin(async move {
			Ok(ids
				.iter()
				.filter_map(|id| self.by_id.get(id))
				.map(|index| self.entries[*index].item.clone())
				.collect())
		})
	}
}

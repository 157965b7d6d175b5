use std::sync::Arc;

use pantry_domain::exclusion;
use pantry_storage::{
	LookupScope,
	models::{Item, ItemKind},
};

/// Absolute exclusion rule. Stores apply the same predicate through [`LookupScope`]; hydrated items
/// are checked again here before they can be scored.
#[derive(Clone, Debug, Default)]
pub struct HardFilter {
	excluded_terms: Vec<String>,
	kind: Option<ItemKind>,
}
impl HardFilter {
	pub fn new(excluded_terms: &[String], kind: Option<ItemKind>) -> Self {
		Self { excluded_terms: exclusion::normalize_terms(excluded_terms), kind }
	}

	pub fn from_scope(scope: &LookupScope) -> Self {
		Self::new(&scope.excluded_terms, scope.kind)
	}

	pub fn allows(&self, item: &Item) -> bool {
		if self.kind.is_some_and(|kind| kind != item.kind) {
			return false;
		}

		!exclusion::is_excluded(&item.tags, &self.excluded_terms)
	}

	pub fn apply(&self, items: Vec<Arc<Item>>) -> Vec<Arc<Item>> {
		items.into_iter().filter(|item| self.allows(item)).collect()
	}
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
	#[default]
	Recipe,
	Venue,
}
impl ItemKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Recipe => "recipe",
			Self::Venue => "venue",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"recipe" => Some(Self::Recipe),
			"venue" => Some(Self::Venue),
			_ => None,
		}
	}
}

/// A catalog entry. Read-only to the search engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
	pub id: String,
	#[serde(default)]
	pub kind: ItemKind,
	pub title: String,
	#[serde(default)]
	pub body: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	/// Ordered; the first tag is the dominant attribute.
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}
impl Item {
	pub fn dominant_tag(&self) -> Option<&str> {
		self.tags.first().map(String::as_str)
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct CatalogItemRow {
	pub item_id: String,
	pub kind: String,
	pub title: String,
	pub body: String,
	pub tags: Vec<String>,
	pub metadata: Value,
	pub embedding_text: Option<String>,
}

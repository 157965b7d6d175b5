use serde_json::{Map, Value};

use pantry_storage::models::{Item, ItemKind};

use crate::embedding::BagOfWordsEmbedder;

pub struct ItemBuilder {
	item: Item,
}
impl ItemBuilder {
	pub fn new(id: &str, title: &str) -> Self {
		Self {
			item: Item {
				id: id.to_string(),
				kind: ItemKind::Recipe,
				title: title.to_string(),
				body: String::new(),
				embedding: None,
				tags: Vec::new(),
				metadata: Map::new(),
			},
		}
	}

	pub fn venue(mut self) -> Self {
		self.item.kind = ItemKind::Venue;

		self
	}

	pub fn body(mut self, body: &str) -> Self {
		self.item.body = body.to_string();

		self
	}

	pub fn tags(mut self, tags: &[&str]) -> Self {
		self.item.tags = tags.iter().map(|tag| tag.to_string()).collect();

		self
	}

	pub fn category(self, category: &str) -> Self {
		self.metadata("category", Value::String(category.to_string()))
	}

	pub fn metadata(mut self, key: &str, value: Value) -> Self {
		self.item.metadata.insert(key.to_string(), value);

		self
	}

	pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
		self.item.embedding = Some(embedding);

		self
	}

	/// Embeds `title` and `body` with the fixture embedder.
	pub fn embedded(self) -> Self {
		let text = format!("{} {}", self.item.title, self.item.body);
		let embedding = BagOfWordsEmbedder.embed_text(&text);

		self.embedding(embedding)
	}

	pub fn build(self) -> Item {
		self.item
	}
}

/// Recipe and venue catalog shared by the search scenarios.
pub fn sample_catalog() -> Vec<Item> {
	vec![
		ItemBuilder::new("r-seafood-kalguksu", "Seafood Kalguksu")
			.body("Knife-cut noodles simmered in a clam and shrimp broth.")
			.tags(&["noodle", "seafood"])
			.category("noodle")
			.embedded()
			.build(),
		ItemBuilder::new("r-haemul-kalguksu", "해물 칼국수")
			.body("바지락과 새우로 끓인 칼국수")
			.tags(&["국수", "해물"])
			.category("noodle")
			.embedded()
			.build(),
		ItemBuilder::new("r-bibim-noodles", "Spicy Bibim Noodles")
			.body("Cold noodles tossed in gochujang sauce.")
			.tags(&["noodle", "spicy"])
			.category("noodle")
			.embedded()
			.build(),
		ItemBuilder::new("r-kimchi-stew", "Kimchi Stew")
			.body("Aged kimchi simmered with pork belly and tofu.")
			.tags(&["stew", "pork", "kimchi"])
			.category("stew")
			.embedded()
			.build(),
		ItemBuilder::new("r-soybean-stew", "Soybean Paste Stew")
			.body("Hearty doenjang stew with tofu and zucchini.")
			.tags(&["stew", "tofu"])
			.category("stew")
			.embedded()
			.build(),
		ItemBuilder::new("r-clam-soup", "Clam Soup")
			.body("A light broth with fresh clams and scallions.")
			.tags(&["soup", "seafood"])
			.category("soup")
			.embedded()
			.build(),
		ItemBuilder::new("r-rice-porridge", "Abalone Rice Porridge")
			.body("Gentle morning porridge with seafood.")
			.tags(&["porridge", "seafood", "breakfast"])
			.category("breakfast")
			.embedded()
			.build(),
		ItemBuilder::new("r-egg-toast", "Egg Toast")
			.body("Street-style breakfast toast with scrambled egg and cabbage.")
			.tags(&["egg", "breakfast"])
			.category("breakfast")
			.embedded()
			.build(),
		ItemBuilder::new("r-rolled-omelet", "Rolled Omelet")
			.body("Layered egg omelet with carrots and scallions.")
			.tags(&["egg", "side"])
			.category("side")
			.embedded()
			.build(),
		ItemBuilder::new("r-steamed-egg", "Steamed Egg")
			.body("Fluffy gyeranjjim cooked in an earthenware pot.")
			.tags(&["egg", "side"])
			.category("side")
			.embedded()
			.build(),
		ItemBuilder::new("r-chocolate-cake", "Chocolate Cake")
			.body("Rich dessert with dark chocolate ganache.")
			.tags(&["dessert"])
			.category("dessert")
			.embedded()
			.build(),
		ItemBuilder::new("v-kalguksu-house", "Myeongdong Kalguksu House")
			.venue()
			.body("Noodle restaurant famous for its chicken broth.")
			.tags(&["restaurant", "noodle"])
			.category("restaurant")
			.embedded()
			.build(),
	]
}

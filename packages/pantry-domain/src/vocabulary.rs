//! Static query vocabulary for the catalog's target language (Korean) plus common English terms.

/// Grammatical markers and filler words dropped from queries by exact token match.
pub const STOPWORDS: &[&str] = &[
	// Korean filler and request phrasing.
	"좀",
	"좀더",
	"그냥",
	"뭐",
	"뭐가",
	"뭘",
	"어떤",
	"무슨",
	"추천",
	"추천해",
	"추천해줘",
	"추천해주세요",
	"알려줘",
	"알려주세요",
	"찾아줘",
	"해줘",
	"해주세요",
	"주세요",
	"있어",
	"있나요",
	"있는",
	"없어",
	"먹고",
	"먹고싶어",
	"먹을",
	"먹을만한",
	"싶어",
	"싶은",
	"만들",
	"만들어",
	"만드는",
	"하는",
	"할",
	"수",
	"것",
	"거",
	"게",
	"좋은",
	"맛있는",
	"레시피",
	"요리",
	"음식",
	"메뉴",
	"그리고",
	"또는",
	"아니면",
	"같은",
	"정도",
	// English filler.
	"a",
	"an",
	"and",
	"any",
	"are",
	"can",
	"find",
	"for",
	"give",
	"how",
	"i",
	"in",
	"is",
	"me",
	"my",
	"of",
	"on",
	"or",
	"please",
	"recipe",
	"recipes",
	"recommend",
	"show",
	"some",
	"something",
	"the",
	"to",
	"want",
	"what",
	"with",
	"you",
];

/// Trailing particles stripped from Hangul tokens, longest first.
///
/// Single-syllable particles that commonly end food nouns (이, 가, 의, 도, 로, 과) are omitted.
pub const PARTICLES: &[&str] = &[
	"에서는", "에서", "으로", "에게", "까지", "부터", "처럼", "이랑", "한테", "하고", "를", "을",
	"은", "는", "와", "랑", "만",
];

/// Ingredient, cooking-method, and diet vocabulary ranked ahead of generic tokens.
pub const PRIORITY_TERMS: &[&str] = &[
	// Ingredients.
	"계란",
	"달걀",
	"두부",
	"김치",
	"돼지고기",
	"소고기",
	"쇠고기",
	"닭고기",
	"닭",
	"새우",
	"해물",
	"해산물",
	"오징어",
	"버섯",
	"감자",
	"고구마",
	"양파",
	"대파",
	"마늘",
	"치즈",
	"우유",
	"쌀",
	"떡",
	"어묵",
	"참치",
	"연어",
	"고등어",
	"미역",
	"시금치",
	"콩나물",
	"애호박",
	"당근",
	"양배추",
	"egg",
	"eggs",
	"tofu",
	"kimchi",
	"pork",
	"beef",
	"chicken",
	"shrimp",
	"seafood",
	"squid",
	"mushroom",
	"potato",
	"onion",
	"garlic",
	"cheese",
	"rice",
	// Dishes and noodles.
	"국수",
	"칼국수",
	"라면",
	"떡볶이",
	"noodle",
	"noodles",
	"kalguksu",
	// Cooking methods.
	"볶음",
	"구이",
	"찜",
	"조림",
	"튀김",
	"무침",
	"찌개",
	"국",
	"탕",
	"전골",
	"grilled",
	"fried",
	"braised",
	"steamed",
	"stew",
	"soup",
	"salad",
	// Diets.
	"비건",
	"채식",
	"저탄수",
	"다이어트",
	"키토",
	"vegan",
	"vegetarian",
	"keto",
];

/// Bidirectional synonym groups. Every term expands to the rest of its group.
pub const SYNONYM_GROUPS: &[&[&str]] = &[
	&["계란", "달걀", "egg", "eggs"],
	&["닭고기", "닭", "chicken"],
	&["돼지고기", "pork"],
	&["소고기", "쇠고기", "beef"],
	&["새우", "shrimp", "prawn"],
	&["해물", "해산물", "seafood"],
	&["두부", "tofu"],
	&["김치", "kimchi"],
	&["버섯", "mushroom"],
	&["감자", "potato"],
	&["칼국수", "kalguksu"],
	&["라면", "ramyeon", "ramen"],
	&["국수", "noodle", "noodles"],
	&["짜장면", "자장면", "jjajangmyeon"],
	&["떡볶이", "tteokbokki"],
	&["찌개", "stew"],
	&["비건", "vegan"],
	&["채식", "vegetarian"],
];

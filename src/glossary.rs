// src/glossary.rs
//
// Automotive glossary: category -> korean term -> entry.
// Built once from a static JSON document, validated on load, read-only afterwards.

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::GlossaryError;

/// Glossary bundled with the crate
const BUILTIN_GLOSSARY: &str = include_str!("../data/automotive_glossary.json");

/// Fixed set of glossary categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Engine,
    Transmission,
    Brakes,
    Suspension,
    WheelsTires,
    Electrical,
    Cooling,
    Lubrication,
    FuelSystem,
    Exhaust,
    Body,
    Interior,
    Maintenance,
    Problems,
    Tools,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Engine,
        Category::Transmission,
        Category::Brakes,
        Category::Suspension,
        Category::WheelsTires,
        Category::Electrical,
        Category::Cooling,
        Category::Lubrication,
        Category::FuelSystem,
        Category::Exhaust,
        Category::Body,
        Category::Interior,
        Category::Maintenance,
        Category::Problems,
        Category::Tools,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Category::Engine => "engine",
            Category::Transmission => "transmission",
            Category::Brakes => "brakes",
            Category::Suspension => "suspension",
            Category::WheelsTires => "wheels_tires",
            Category::Electrical => "electrical",
            Category::Cooling => "cooling",
            Category::Lubrication => "lubrication",
            Category::FuelSystem => "fuel_system",
            Category::Exhaust => "exhaust",
            Category::Body => "body",
            Category::Interior => "interior",
            Category::Maintenance => "maintenance",
            Category::Problems => "problems",
            Category::Tools => "tools",
        }
    }

    pub fn from_id(id: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.id() == id)
    }

    /// Korean label shown to the user
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Engine => "엔진",
            Category::Transmission => "변속기",
            Category::Brakes => "브레이크",
            Category::Suspension => "서스펜션",
            Category::WheelsTires => "바퀴/타이어",
            Category::Electrical => "전기 시스템",
            Category::Cooling => "냉각 시스템",
            Category::Lubrication => "윤활 시스템",
            Category::FuelSystem => "연료 시스템",
            Category::Exhaust => "배기 시스템",
            Category::Body => "차체",
            Category::Interior => "내장",
            Category::Maintenance => "정비",
            Category::Problems => "고장/문제",
            Category::Tools => "공구",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Label for a raw category identifier, falling back to the identifier itself
pub fn category_display_name(id: &str) -> String {
    Category::from_id(id)
        .map(|c| c.display_name().to_string())
        .unwrap_or_else(|| id.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub korean: String,
    pub english: String,
    pub category: Category,
    pub description: String,
}

/// Term record as it appears in the JSON document, before validation
#[derive(Deserialize)]
struct RawTerm {
    english: String,
    category: String,
    description: String,
}

type RawGlossary = IndexMap<String, IndexMap<String, RawTerm>>;

/// Read-only term index. Entries are stored flat in category order, then
/// per-category insertion order.
#[derive(Debug, Clone)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
    categories: IndexMap<Category, Vec<usize>>,
    by_korean: HashMap<String, usize>,
}

impl Glossary {
    pub fn builtin() -> Result<Self, GlossaryError> {
        Self::from_json_str(BUILTIN_GLOSSARY)
    }

    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        let data = fs::read_to_string(path).map_err(|source| GlossaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let glossary = Self::from_json_str(&data)?;
        info!("[Glossary] Loaded {} terms from {}", glossary.len(), path.display());
        Ok(glossary)
    }

    pub fn from_json_str(data: &str) -> Result<Self, GlossaryError> {
        let raw: RawGlossary = serde_json::from_str(data)?;

        let mut entries = Vec::new();
        for (category_id, terms) in raw {
            let category = Category::from_id(&category_id)
                .ok_or_else(|| GlossaryError::UnknownCategory(category_id.clone()))?;

            for (korean, term) in terms {
                if term.category != category_id {
                    return Err(GlossaryError::CategoryMismatch {
                        term: korean,
                        listed_under: category_id,
                        declared: term.category,
                    });
                }
                entries.push(GlossaryEntry {
                    korean,
                    english: term.english,
                    category,
                    description: term.description,
                });
            }
        }

        Self::from_entries(entries)
    }

    /// Build from already-typed entries. Category order follows first appearance.
    pub fn from_entries(entries: Vec<GlossaryEntry>) -> Result<Self, GlossaryError> {
        let mut categories: IndexMap<Category, Vec<GlossaryEntry>> = IndexMap::new();
        for entry in entries {
            if entry.korean.trim().is_empty() {
                return Err(GlossaryError::EmptyField {
                    term: entry.korean,
                    field: "korean",
                });
            }
            if entry.english.trim().is_empty() {
                return Err(GlossaryError::EmptyField {
                    term: entry.korean,
                    field: "english",
                });
            }
            categories.entry(entry.category).or_default().push(entry);
        }

        let mut flat = Vec::new();
        let mut category_index: IndexMap<Category, Vec<usize>> = IndexMap::new();
        let mut by_korean: HashMap<String, usize> = HashMap::new();

        for (category, terms) in categories {
            let positions = category_index.entry(category).or_default();
            for entry in terms {
                let position = flat.len();
                if let Some(&existing) = by_korean.get(&entry.korean) {
                    let first: &GlossaryEntry = &flat[existing];
                    return Err(GlossaryError::DuplicateTerm {
                        term: entry.korean,
                        first: first.category.id().to_string(),
                        second: category.id().to_string(),
                    });
                }
                by_korean.insert(entry.korean.clone(), position);
                positions.push(position);
                flat.push(entry);
            }
        }

        Ok(Self {
            entries: flat,
            categories: category_index,
            by_korean,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, category order then insertion order
    pub fn all_entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    pub fn by_category(&self, category: Category) -> Vec<&GlossaryEntry> {
        self.categories
            .get(&category)
            .map(|positions| positions.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default()
    }

    /// Lookup by raw category identifier; unknown identifiers yield nothing
    pub fn by_category_id(&self, id: &str) -> Vec<&GlossaryEntry> {
        Category::from_id(id)
            .map(|category| self.by_category(category))
            .unwrap_or_default()
    }

    /// Categories in load order
    pub fn categories(&self) -> Vec<Category> {
        self.categories.keys().copied().collect()
    }

    pub fn display_name(&self, id: &str) -> String {
        category_display_name(id)
    }

    pub fn get(&self, korean: &str) -> Option<&GlossaryEntry> {
        self.by_korean.get(korean).map(|&i| &self.entries[i])
    }

    /// First entry whose korean form contains `fragment`
    pub fn search_korean(&self, fragment: &str) -> Option<&GlossaryEntry> {
        self.entries.iter().find(|e| e.korean.contains(fragment))
    }

    /// First entry whose english form contains `fragment`, ignoring case
    pub fn search_english(&self, fragment: &str) -> Option<&GlossaryEntry> {
        let needle = fragment.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.english.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "brakes": {
            "브레이크": { "english": "brake", "category": "brakes", "description": "제동 장치" },
            "캘리퍼": { "english": "caliper", "category": "brakes", "description": "유압 장치" }
        },
        "engine": {
            "엔진": { "english": "engine", "category": "engine", "description": "동력 장치" }
        }
    }"#;

    #[test]
    fn test_load_preserves_order() {
        let glossary = Glossary::from_json_str(SMALL).unwrap();
        let korean: Vec<&str> = glossary.all_entries().iter().map(|e| e.korean.as_str()).collect();
        assert_eq!(korean, vec!["브레이크", "캘리퍼", "엔진"]);
        assert_eq!(glossary.categories(), vec![Category::Brakes, Category::Engine]);
    }

    #[test]
    fn test_by_category() {
        let glossary = Glossary::from_json_str(SMALL).unwrap();
        assert_eq!(glossary.by_category(Category::Brakes).len(), 2);
        assert!(glossary.by_category(Category::Tools).is_empty());
        assert!(glossary.by_category_id("spaceships").is_empty());
        assert_eq!(glossary.by_category_id("engine")[0].english, "engine");
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(category_display_name("wheels_tires"), "바퀴/타이어");
        assert_eq!(category_display_name("spaceships"), "spaceships");
    }

    #[test]
    fn test_rejects_unknown_category() {
        let data = r#"{ "rockets": { "로켓": { "english": "rocket", "category": "rockets", "description": "" } } }"#;
        assert!(matches!(
            Glossary::from_json_str(data),
            Err(GlossaryError::UnknownCategory(c)) if c == "rockets"
        ));
    }

    #[test]
    fn test_rejects_missing_field() {
        let data = r#"{ "engine": { "엔진": { "category": "engine", "description": "" } } }"#;
        assert!(matches!(Glossary::from_json_str(data), Err(GlossaryError::Parse(_))));
    }

    #[test]
    fn test_rejects_category_mismatch() {
        let data = r#"{ "engine": { "엔진": { "english": "engine", "category": "body", "description": "" } } }"#;
        assert!(matches!(
            Glossary::from_json_str(data),
            Err(GlossaryError::CategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_across_categories() {
        let data = r#"{
            "engine": { "오일": { "english": "oil", "category": "engine", "description": "" } },
            "lubrication": { "오일": { "english": "oil", "category": "lubrication", "description": "" } }
        }"#;
        match Glossary::from_json_str(data) {
            Err(GlossaryError::DuplicateTerm { term, first, second }) => {
                assert_eq!(term, "오일");
                assert_eq!(first, "engine");
                assert_eq!(second, "lubrication");
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_english() {
        let data = r#"{ "engine": { "엔진": { "english": " ", "category": "engine", "description": "" } } }"#;
        assert!(matches!(
            Glossary::from_json_str(data),
            Err(GlossaryError::EmptyField { field: "english", .. })
        ));
    }

    #[test]
    fn test_substring_lookups() {
        let glossary = Glossary::from_json_str(SMALL).unwrap();
        assert_eq!(glossary.search_korean("레이").unwrap().korean, "브레이크");
        assert_eq!(glossary.search_english("CALI").unwrap().korean, "캘리퍼");
        assert!(glossary.search_english("turbo").is_none());
        assert_eq!(glossary.get("엔진").unwrap().category, Category::Engine);
        assert!(glossary.get("엔").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        fs::write(&path, SMALL).unwrap();
        assert_eq!(Glossary::load(&path).unwrap().len(), 3);

        let missing = dir.path().join("missing.json");
        assert!(matches!(Glossary::load(&missing), Err(GlossaryError::Io { .. })));
    }

    #[test]
    fn test_builtin_glossary_is_valid() {
        let glossary = Glossary::builtin().unwrap();
        assert_eq!(glossary.categories().len(), Category::ALL.len());
        assert!(glossary.get("브레이크").is_some());
        assert!(glossary.get("엔진").is_some());
        assert!(glossary.get("오일").is_some());
    }
}

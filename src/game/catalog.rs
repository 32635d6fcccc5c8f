use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

const BUNDLED_CATALOG: &str = include_str!("../../data/achievements.json");

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AchievementRecord {
    pub id: u32,
    pub title: String,
    pub emoji: String,
    pub details: String,
    pub theme: String,
    #[serde(default)]
    pub color: String,
}

/// Read-only list of records that drives every card in a deck.
///
/// Ids are guaranteed positive and unique once a `Catalog` exists.
#[derive(Clone, Debug)]
pub struct Catalog {
    records: Vec<AchievementRecord>,
}

impl Catalog {
    pub fn new(records: Vec<AchievementRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if record.id == 0 {
                return Err(CatalogError::ZeroId);
            }
            if !seen.insert(record.id) {
                return Err(CatalogError::DuplicateId(record.id));
            }
        }
        Ok(Self { records })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let records: Vec<AchievementRecord> = serde_json::from_str(raw)?;
        Self::new(records)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// The eight achievements shipped with the game.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn records(&self) -> &[AchievementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&AchievementRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32) -> AchievementRecord {
        AchievementRecord {
            id,
            title: format!("Title {id}"),
            emoji: "⭐".to_string(),
            details: format!("Details {id}"),
            theme: format!("Theme {id}"),
            color: String::new(),
        }
    }

    #[test]
    fn bundled_catalog_has_eight_unique_records() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(catalog.len(), 8);
        let ids: HashSet<u32> = catalog.records().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(catalog.get(5).unwrap().title, "Opgraderinger");
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));
    }

    #[test]
    fn rejects_zero_and_duplicate_ids() {
        assert!(matches!(
            Catalog::new(vec![record(1), record(0)]),
            Err(CatalogError::ZeroId)
        ));
        assert!(matches!(
            Catalog::new(vec![record(3), record(4), record(3)]),
            Err(CatalogError::DuplicateId(3))
        ));
    }

    #[test]
    fn color_is_optional_in_json() {
        let catalog = Catalog::from_json(
            r#"[{"id": 7, "title": "T", "emoji": "E", "details": "D", "theme": "Th"}]"#,
        )
        .unwrap();
        assert_eq!(catalog.get(7).unwrap().color, "");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Catalog::from_json("[{\"id\": 1}"),
            Err(CatalogError::Parse(_))
        ));
    }
}

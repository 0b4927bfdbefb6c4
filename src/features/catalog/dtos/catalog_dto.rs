use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::catalog::models::{Category, Fault};
use crate::shared::constants::CategoryTile;
use crate::shared::types::empty_string_as_none;

/// Query params shared by the landing page and the report form
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CategoryQuery {
    /// Category to scope the page to
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub categoria_id: Option<i32>,
}

/// Fault option for the report form's dependent select
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FaultOptionDto {
    pub id: i32,
    #[serde(rename = "descripcion")]
    pub description: String,
}

impl From<Fault> for FaultOptionDto {
    fn from(f: Fault) -> Self {
        Self {
            id: f.id,
            description: f.description,
        }
    }
}

/// Category names in lexical order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryNamesDto {
    pub categorias: Vec<String>,
}

/// Landing page tile: hardcoded name and image plus the catalog's blurb
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTileView {
    pub id: i32,
    pub name: &'static str,
    pub image: &'static str,
    pub info: Option<String>,
}

impl CategoryTileView {
    /// Merge the hardcoded tiles with blurbs from the catalog, matched by id
    pub fn merge(tiles: &[CategoryTile], categories: &[Category]) -> Vec<Self> {
        tiles
            .iter()
            .map(|tile| Self {
                id: tile.id,
                name: tile.name,
                image: tile.image,
                info: categories
                    .iter()
                    .find(|c| c.id == tile.id)
                    .and_then(|c| c.info.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::CATEGORY_TILES;

    #[test]
    fn test_merge_attaches_blurbs_by_id() {
        let categories = vec![
            Category {
                id: 2,
                name: "Plomeria".to_string(),
                info: Some("Fugas y tuberías".to_string()),
            },
            Category {
                id: 42,
                name: "Desconocida".to_string(),
                info: Some("no tile".to_string()),
            },
        ];

        let tiles = CategoryTileView::merge(CATEGORY_TILES, &categories);

        assert_eq!(tiles.len(), CATEGORY_TILES.len());
        assert_eq!(tiles[1].info.as_deref(), Some("Fugas y tuberías"));
        assert!(tiles.iter().filter(|t| t.id != 2).all(|t| t.info.is_none()));
    }

    #[test]
    fn test_fault_option_serializes_spanish_key() {
        let dto = FaultOptionDto {
            id: 7,
            description: "Fuga de agua".to_string(),
        };
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "descripcion": "Fuga de agua"}));
    }
}

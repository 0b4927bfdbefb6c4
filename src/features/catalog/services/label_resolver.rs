use std::collections::HashMap;
use std::fmt;

use crate::features::catalog::models::{Category, Fault, Site};
use crate::shared::constants::LABEL_NOT_AVAILABLE;

/// Identifier pointing into another datastore.
///
/// Nothing guarantees the target row exists, so resolution always yields a
/// [`Resolution`] rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftRef(pub Option<i32>);

/// Outcome of resolving a [`SoftRef`] against an id -> name table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The row carried no identifier
    Absent,
    /// The identifier has no row in the lookup table
    Unmatched(i32),
    Resolved(&'a str),
}

impl SoftRef {
    pub fn resolve<'a>(self, names: &'a HashMap<i32, String>) -> Resolution<'a> {
        match self.0 {
            None => Resolution::Absent,
            Some(id) => names
                .get(&id)
                .map(|name| Resolution::Resolved(name.as_str()))
                .unwrap_or(Resolution::Unmatched(id)),
        }
    }
}

impl Resolution<'_> {
    /// Resolved name, or `fallback` for both absent and unmatched ids
    pub fn name_or(&self, fallback: &str) -> String {
        match self {
            Resolution::Resolved(name) => name.to_string(),
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for Resolution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Absent => f.write_str(LABEL_NOT_AVAILABLE),
            Resolution::Unmatched(id) => write!(f, "(Sin nombre, ID={})", id),
            Resolution::Resolved(name) => f.write_str(name),
        }
    }
}

/// id -> display name tables fetched from the catalog and sites stores
#[derive(Debug, Clone, Default)]
pub struct LabelMaps {
    pub categories: HashMap<i32, String>,
    pub faults: HashMap<i32, String>,
    pub sites: HashMap<i32, String>,
    pub site_coordinates: HashMap<i32, (Option<f64>, Option<f64>)>,
}

impl LabelMaps {
    pub fn from_rows(categories: Vec<Category>, faults: Vec<Fault>, sites: Vec<Site>) -> Self {
        let site_coordinates = sites
            .iter()
            .map(|s| (s.id, (s.latitude, s.longitude)))
            .collect();

        Self {
            categories: categories.into_iter().map(|c| (c.id, c.name)).collect(),
            faults: faults.into_iter().map(|f| (f.id, f.description)).collect(),
            sites: sites.into_iter().map(|s| (s.id, s.name)).collect(),
            site_coordinates,
        }
    }

    pub fn category(&self, id: Option<i32>) -> Resolution<'_> {
        SoftRef(id).resolve(&self.categories)
    }

    pub fn fault(&self, id: Option<i32>) -> Resolution<'_> {
        SoftRef(id).resolve(&self.faults)
    }

    pub fn site(&self, id: Option<i32>) -> Resolution<'_> {
        SoftRef(id).resolve(&self.sites)
    }

    /// (latitude, longitude) of a site, when the site is known
    pub fn site_location(&self, id: Option<i32>) -> (Option<f64>, Option<f64>) {
        id.and_then(|id| self.site_coordinates.get(&id).copied())
            .unwrap_or((None, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> LabelMaps {
        LabelMaps::from_rows(
            vec![
                Category {
                    id: 1,
                    name: "Electricos".to_string(),
                    info: None,
                },
                Category {
                    id: 2,
                    name: "Plomeria".to_string(),
                    info: Some("Tuberías".to_string()),
                },
            ],
            vec![Fault {
                id: 10,
                category_id: 1,
                description: "Bombillo quemado".to_string(),
                info: None,
            }],
            vec![Site {
                id: 3,
                name: "Sede Atlántico".to_string(),
                latitude: Some(8.29),
                longitude: Some(-62.72),
            }],
        )
    }

    #[test]
    fn test_known_id_resolves_to_name() {
        let maps = maps();
        assert_eq!(maps.category(Some(2)), Resolution::Resolved("Plomeria"));
        assert_eq!(maps.fault(Some(10)).to_string(), "Bombillo quemado");
        assert_eq!(maps.site(Some(3)).to_string(), "Sede Atlántico");
    }

    #[test]
    fn test_unknown_id_embeds_the_id() {
        let maps = maps();
        assert_eq!(maps.category(Some(99)), Resolution::Unmatched(99));
        assert_eq!(maps.category(Some(99)).to_string(), "(Sin nombre, ID=99)");
    }

    #[test]
    fn test_absent_id_is_not_available_never_unmatched() {
        let maps = maps();
        let site = maps.site(None);
        assert_eq!(site, Resolution::Absent);
        assert_eq!(site.to_string(), "(N/D)");
        assert!(!site.to_string().contains("ID="));
    }

    #[test]
    fn test_every_category_in_table_resolves() {
        let maps = maps();
        for (id, name) in &maps.categories {
            assert_eq!(maps.category(Some(*id)).to_string(), *name);
        }
    }

    #[test]
    fn test_empty_maps_degrade_to_markers() {
        let maps = LabelMaps::default();
        assert_eq!(maps.fault(Some(4)).to_string(), "(Sin nombre, ID=4)");
        assert_eq!(maps.fault(None).to_string(), "(N/D)");
    }

    #[test]
    fn test_name_or_uses_fallback_for_missing() {
        let maps = maps();
        assert_eq!(maps.site(Some(3)).name_or("No encontrado"), "Sede Atlántico");
        assert_eq!(maps.site(Some(4)).name_or("No encontrado"), "No encontrado");
        assert_eq!(maps.site(None).name_or("No encontrado"), "No encontrado");
    }

    #[test]
    fn test_site_location() {
        let maps = maps();
        assert_eq!(maps.site_location(Some(3)), (Some(8.29), Some(-62.72)));
        assert_eq!(maps.site_location(Some(5)), (None, None));
        assert_eq!(maps.site_location(None), (None, None));
    }
}

// Compound record filters: free-text search plus categorical equality
use crate::domain::records::Searchable;
use std::collections::HashMap;

/// Categorical value meaning "no constraint".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub query: String,
    pub text_fields: Vec<&'static str>,
    pub categorical: Vec<(&'static str, String)>,
}

impl FilterSpec {
    pub fn new(text_fields: &[&'static str]) -> Self {
        Self {
            query: String::new(),
            text_fields: text_fields.to_vec(),
            categorical: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.categorical.push((field, value.into()));
        self
    }

    /// Build a filter from request parameters: `q` for text, plus one
    /// parameter per categorical key. Unknown parameters are ignored.
    pub fn from_params(
        params: &HashMap<String, String>,
        text_fields: &[&'static str],
        categorical_keys: &[&'static str],
    ) -> Self {
        let mut spec = Self::new(text_fields);
        if let Some(q) = params.get("q") {
            spec.query = q.clone();
        }
        for key in categorical_keys {
            if let Some(value) = params.get(*key) {
                spec.categorical.push((*key, value.clone()));
            }
        }
        spec
    }

    /// Filter for a record type using its own searchable fields.
    pub fn for_record<T: Searchable>(params: &HashMap<String, String>) -> Self {
        Self::from_params(params, T::TEXT_FIELDS, T::CATEGORIES)
    }

    fn text_matches<T: Searchable>(&self, record: &T) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.text_fields.iter().any(|name| {
            record
                .field(name)
                .map(|value| value.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }

    fn categories_match<T: Searchable>(&self, record: &T) -> bool {
        self.categorical.iter().all(|(name, wanted)| {
            let wanted = wanted.trim().to_lowercase();
            if wanted.is_empty() || wanted == ALL {
                return true;
            }
            record
                .field(name)
                .map(|value| value.trim().to_lowercase() == wanted)
                .unwrap_or(false)
        })
    }

    pub fn matches<T: Searchable>(&self, record: &T) -> bool {
        self.text_matches(record) && self.categories_match(record)
    }
}

/// Records matching the spec, in input order.
pub fn filter<'a, T: Searchable>(records: &'a [T], spec: &FilterSpec) -> Vec<&'a T> {
    records.iter().filter(|r| spec.matches(*r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::count;
    use crate::domain::records::{Asset, AssetStatus, Searchable};

    fn asset(id: &str, name: &str, kind: &str, status: AssetStatus, serial: Option<&str>) -> Asset {
        Asset {
            id: id.to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            status,
            assigned_to: None,
            warranty_expiry: None,
            serial_number: serial.map(str::to_string),
        }
    }

    fn inventory() -> Vec<Asset> {
        vec![
            asset("1", "HP LaserJet 400", "Printer", AssetStatus::Available, Some("HPX-001")),
            asset("2", "Dell Latitude", "Laptop", AssetStatus::Assigned, Some("DL-778")),
            asset("3", "Cisco Catalyst", "Switch", AssetStatus::Maintenance, None),
            asset("4", "Brother HL", "printer", AssetStatus::Retired, Some("BR-42")),
        ]
    }

    fn ids(records: &[&Asset]) -> Vec<String> {
        records.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name"]);
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_text_search_is_case_insensitive_across_fields() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name", "serial_number"]).with_query("dl-");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["2"]);

        let spec = FilterSpec::new(&["name", "serial_number"]).with_query("  LASERJET ");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1"]);
    }

    #[test]
    fn test_categorical_all_means_unconstrained() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name"]).with_category("status", "All");
        assert_eq!(filter(&assets, &spec).len(), 4);
    }

    #[test]
    fn test_categorical_exact_case_insensitive_match() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name"]).with_category("type", "PRINTER");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1", "4"]);

        let spec = spec.with_category("status", "retired");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["4"]);

        // Exact, not substring
        let spec = FilterSpec::new(&["name"]).with_category("type", "print");
        assert!(filter(&assets, &spec).is_empty());
    }

    #[test]
    fn test_categorical_match_folds_non_ascii_case() {
        let assets = vec![
            asset("1", "Caméra IP", "Équipement réseau", AssetStatus::Available, None),
            asset("2", "Routeur", "Serveur", AssetStatus::Available, None),
        ];

        let spec = FilterSpec::new(&["name"]).with_category("type", "équipement RÉSEAU");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1"]);

        // Text search and categorical filters agree on case folding
        let spec = FilterSpec::new(&["type"]).with_query("ÉQUIPEMENT");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1"]);
    }

    #[test]
    fn test_missing_field_fails_categorical_filter() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name"]).with_category("serial_number", "HPX-001");
        assert_eq!(ids(&filter(&assets, &spec)), vec!["1"]);

        let spec = FilterSpec::new(&["name"]).with_category("nonexistent", "x");
        assert!(filter(&assets, &spec).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent_and_agrees_with_count() {
        let assets = inventory();
        let spec = FilterSpec::new(&["name", "type"]).with_query("er");

        let once: Vec<Asset> = filter(&assets, &spec).into_iter().cloned().collect();
        let twice = filter(&once, &spec);

        assert_eq!(ids(&twice), once.iter().map(|a| a.id.clone()).collect::<Vec<_>>());
        assert_eq!(count(&assets, |a| spec.matches(a)), once.len());
    }

    #[test]
    fn test_from_params() {
        let mut params = HashMap::new();
        params.insert("q".to_string(), "dell".to_string());
        params.insert("status".to_string(), "assigned".to_string());
        params.insert("page".to_string(), "2".to_string());

        let spec = FilterSpec::from_params(&params, &["name"], &["status", "type"]);
        assert_eq!(spec.query, "dell");
        assert_eq!(spec.categorical, vec![("status", "assigned".to_string())]);

        let assets = inventory();
        assert_eq!(ids(&filter(&assets, &spec)), vec!["2"]);

        params.insert("type".to_string(), "laptop".to_string());
        let spec = FilterSpec::for_record::<Asset>(&params);
        assert_eq!(spec.text_fields, Asset::TEXT_FIELDS);
        assert_eq!(spec.categorical.len(), 2);
        assert_eq!(ids(&filter(&assets, &spec)), vec!["2"]);
    }
}

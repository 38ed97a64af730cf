//! Prize catalog definitions
//!
//! The catalog is fixed configuration: an ordered list of prize categories
//! and a parallel list of selection weights. It is validated once, when it is
//! built, so a misweighted catalog can never serve a draw.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Built-in prize definition
#[derive(Debug, Clone, PartialEq)]
pub struct PrizeDef {
    pub id: &'static str,
    pub label: &'static str,
    /// Relative selection weight. Weights need not sum to 100.
    pub weight: f64,
    pub color: &'static str,
    pub text_color: &'static str,
}

/// Default prize table, in wheel order
pub const DEFAULT_PRIZES: &[PrizeDef] = &[
    PrizeDef {
        id: "1",
        label: "E-book Digital Exclusive",
        weight: 50.0,
        color: "#0066cc",
        text_color: "#ffffff",
    },
    PrizeDef {
        id: "2",
        label: "Desconto Especial em Cursos e Programas",
        weight: 35.0,
        color: "#f0f0f0",
        text_color: "#0066cc",
    },
    PrizeDef {
        id: "3",
        label: "Presente CDPI Pharma",
        weight: 10.0,
        color: "#0066cc",
        text_color: "#ffffff",
    },
    PrizeDef {
        id: "4",
        label: "Kit Premium CDPI Pharma",
        weight: 5.0,
        color: "#f0f0f0",
        text_color: "#0066cc",
    },
];

/// A prize category with its selection weight and wheel colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeCategory {
    pub id: String,
    pub label: String,
    pub weight: f64,
    pub color: String,
    pub text_color: String,
}

impl From<&PrizeDef> for PrizeCategory {
    fn from(def: &PrizeDef) -> Self {
        Self {
            id: def.id.to_string(),
            label: def.label.to_string(),
            weight: def.weight,
            color: def.color.to_string(),
            text_color: def.text_color.to_string(),
        }
    }
}

/// Prize entry as written in a catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub id: String,
    pub label: String,
    pub color: String,
    pub text_color: String,
}

/// On-disk catalog shape: prizes and weights are parallel arrays
///
/// ```toml
/// weights = [50, 35, 10, 5]
///
/// [[prizes]]
/// id = "1"
/// label = "E-book Digital Exclusive"
/// color = "#0066cc"
/// text_color = "#ffffff"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub prizes: Vec<PrizeEntry>,
    pub weights: Vec<f64>,
}

/// Catalog configuration errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog has no prize categories")]
    Empty,

    #[error("Weight count ({weights}) does not match category count ({categories})")]
    WeightCountMismatch { categories: usize, weights: usize },

    #[error("Weight for {label:?} must be a positive finite number, got {weight}")]
    InvalidWeight { label: String, weight: f64 },

    #[error("Sum of weights is not a finite number")]
    TotalWeightOverflow,

    #[error("Duplicate prize label: {0}")]
    DuplicateLabel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Validated, immutable prize catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    categories: Vec<PrizeCategory>,
    total_weight: f64,
}

impl Catalog {
    /// Build a catalog from prize entries and their parallel weights
    pub fn new(prizes: Vec<PrizeEntry>, weights: Vec<f64>) -> Result<Self, CatalogError> {
        if prizes.len() != weights.len() {
            return Err(CatalogError::WeightCountMismatch {
                categories: prizes.len(),
                weights: weights.len(),
            });
        }

        let categories = prizes
            .into_iter()
            .zip(weights)
            .map(|(p, weight)| PrizeCategory {
                id: p.id,
                label: p.label,
                weight,
                color: p.color,
                text_color: p.text_color,
            })
            .collect();

        Self::from_categories(categories)
    }

    /// Validate a list of categories that already carry their weights
    pub fn from_categories(categories: Vec<PrizeCategory>) -> Result<Self, CatalogError> {
        if categories.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for c in &categories {
            if !(c.weight.is_finite() && c.weight > 0.0) {
                return Err(CatalogError::InvalidWeight {
                    label: c.label.clone(),
                    weight: c.weight,
                });
            }
            if !seen.insert(c.label.as_str()) {
                return Err(CatalogError::DuplicateLabel(c.label.clone()));
            }
        }

        let total_weight: f64 = categories.iter().map(|c| c.weight).sum();
        if !total_weight.is_finite() {
            return Err(CatalogError::TotalWeightOverflow);
        }
        Ok(Self {
            categories,
            total_weight,
        })
    }

    /// Parse and validate a TOML catalog
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.prizes, file.weights)
    }

    /// Load and validate a TOML catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn categories(&self) -> &[PrizeCategory] {
        &self.categories
    }

    pub fn get(&self, index: usize) -> Option<&PrizeCategory> {
        self.categories.get(index)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Position of the category with the given display label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.label == label)
    }

    /// Probability of drawing a category (weight / total_weight)
    pub fn probability(&self, index: usize) -> Option<f64> {
        self.get(index).map(|c| c.weight / self.total_weight)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let categories: Vec<PrizeCategory> = DEFAULT_PRIZES.iter().map(Into::into).collect();
        let total_weight = categories.iter().map(|c| c.weight).sum();
        Self {
            categories,
            total_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, label: &str) -> PrizeEntry {
        PrizeEntry {
            id: id.to_string(),
            label: label.to_string(),
            color: "#000000".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = Catalog::default();
        let revalidated = Catalog::from_categories(catalog.categories().to_vec()).unwrap();
        assert_eq!(revalidated, catalog);
        assert_eq!(catalog.len(), 4);
        assert!((catalog.total_weight() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_probability() {
        let catalog = Catalog::default();
        assert!((catalog.probability(0).unwrap() - 0.50).abs() < 1e-12);
        assert!((catalog.probability(3).unwrap() - 0.05).abs() < 1e-12);
        assert_eq!(catalog.probability(4), None);

        let total: f64 = (0..catalog.len()).filter_map(|i| catalog.probability(i)).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_weights_need_not_sum_to_100() {
        let catalog = Catalog::new(vec![entry("a", "A"), entry("b", "B")], vec![1.0, 3.0]).unwrap();
        assert!((catalog.probability(1).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_weight_count_mismatch() {
        let err = Catalog::new(vec![entry("a", "A"), entry("b", "B")], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::WeightCountMismatch {
                categories: 2,
                weights: 1
            }
        ));
    }

    #[test]
    fn test_rejects_bad_weights() {
        for weight in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = Catalog::new(vec![entry("a", "A")], vec![weight]).unwrap_err();
            assert!(matches!(err, CatalogError::InvalidWeight { .. }), "{weight}");
        }
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            Catalog::new(vec![], vec![]).unwrap_err(),
            CatalogError::Empty
        ));

        let err = Catalog::new(vec![entry("a", "Same"), entry("b", "Same")], vec![1.0, 1.0])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateLabel(label) if label == "Same"));
    }

    #[test]
    fn test_from_toml() {
        let toml = r##"
weights = [3, 1]

[[prizes]]
id = "mug"
label = "Mug"
color = "#112233"
text_color = "#ffffff"

[[prizes]]
id = "pen"
label = "Pen"
color = "#445566"
text_color = "#000000"
"##;
        let catalog = Catalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.index_of("Pen"), Some(1));
        assert!((catalog.get(0).unwrap().weight - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_toml_mismatch_fails() {
        let toml = r##"
weights = [3, 1, 1]

[[prizes]]
id = "mug"
label = "Mug"
color = "#112233"
text_color = "#ffffff"
"##;
        assert!(matches!(
            Catalog::from_toml_str(toml).unwrap_err(),
            CatalogError::WeightCountMismatch { .. }
        ));
    }

    #[test]
    fn test_shipped_example_matches_defaults() {
        let toml = include_str!("../../../share/catalog.example.toml");
        assert_eq!(Catalog::from_toml_str(toml).unwrap(), Catalog::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r##"
weights = [3, 1]

[[prizes]]
id = "a"
label = "Sticker"
color = "#ffffff"
text_color = "#000000"

[[prizes]]
id = "b"
label = "Mug"
color = "#000000"
text_color = "#ffffff"
"##,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.probability(0), Some(0.75));
    }

    #[test]
    fn test_rejects_overflowing_total_weight() {
        let err = Catalog::new(
            vec![entry("a", "A"), entry("b", "B")],
            vec![f64::MAX, f64::MAX],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::TotalWeightOverflow));
    }
}

//! Weighted prize selection and redemption codes

use crate::catalog::{Catalog, PrizeCategory};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest redemption code value
pub const CODE_MIN: u32 = 100_000;

/// Largest redemption code value
pub const CODE_MAX: u32 = 999_999;

/// Six-digit numeric redemption code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedemptionCode(String);

/// Error for strings that are not valid redemption codes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid redemption code: {0:?}")]
pub struct CodeError(pub String);

impl RedemptionCode {
    /// Draw a uniform code in [CODE_MIN, CODE_MAX]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(CODE_MIN..=CODE_MAX).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RedemptionCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 6
            && s.bytes().all(|b| b.is_ascii_digit())
            && s.parse::<u32>()
                .is_ok_and(|v| (CODE_MIN..=CODE_MAX).contains(&v));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(CodeError(s.to_string()))
        }
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = CodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RedemptionCode> for String {
    fn from(code: RedemptionCode) -> Self {
        code.0
    }
}

impl fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResult {
    /// Position of the category in the catalog
    pub index: usize,
    pub category: PrizeCategory,
    pub code: RedemptionCode,
}

/// Weighted random prize selector
///
/// Holds cumulative weight boundaries over the catalog order. Each draw is
/// independent; no state is carried between calls.
#[derive(Debug, Clone)]
pub struct PrizeSelector {
    catalog: Catalog,
    boundaries: Vec<f64>,
}

impl PrizeSelector {
    pub fn new(catalog: Catalog) -> Self {
        let boundaries = catalog
            .categories()
            .iter()
            .scan(0.0, |acc, c| {
                *acc += c.weight;
                Some(*acc)
            })
            .collect();
        Self {
            catalog,
            boundaries,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Index of the first category whose cumulative boundary exceeds `point`
    ///
    /// `point` is expected in [0, total_weight). Anything at or beyond the
    /// last boundary (float rounding) resolves to the last category.
    pub fn category_at(&self, point: f64) -> usize {
        self.boundaries
            .iter()
            .position(|&b| b > point)
            .unwrap_or(self.boundaries.len() - 1)
    }

    /// Draw a category index only
    pub fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let point = rng.gen_range(0.0..self.catalog.total_weight());
        self.category_at(point)
    }

    /// Draw a category and an independent redemption code
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> DrawResult {
        let index = self.draw_index(rng);
        let code = RedemptionCode::generate(rng);
        DrawResult {
            index,
            category: self.catalog.categories()[index].clone(),
            code,
        }
    }
}

impl Default for PrizeSelector {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_category_at_boundaries() {
        // Default weights [50, 35, 10, 5] -> boundaries [50, 85, 95, 100]
        let selector = PrizeSelector::default();
        assert_eq!(selector.category_at(0.0), 0);
        assert_eq!(selector.category_at(49.999), 0);
        assert_eq!(selector.category_at(50.0), 1);
        assert_eq!(selector.category_at(84.9), 1);
        assert_eq!(selector.category_at(85.0), 2);
        assert_eq!(selector.category_at(95.0), 3);
        assert_eq!(selector.category_at(99.999), 3);
        assert_eq!(selector.category_at(100.0), 3);
    }

    #[test]
    fn test_fixed_sequence_source() {
        // An all-zero source lands on the lowest point of every range
        let selector = PrizeSelector::default();
        let mut rng = StepRng::new(0, 0);
        let result = selector.draw(&mut rng);
        assert_eq!(result.index, 0);
        assert_eq!(result.category.label, "E-book Digital Exclusive");
        assert_eq!(result.code.as_str(), "100000");
    }

    #[test]
    fn test_codes_are_six_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let code = RedemptionCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), 6);
            let value: u32 = code.as_str().parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value));
        }
    }

    #[test]
    fn test_code_parse() {
        assert!("123456".parse::<RedemptionCode>().is_ok());
        assert!("999999".parse::<RedemptionCode>().is_ok());
        assert!("099999".parse::<RedemptionCode>().is_err());
        assert!("12345".parse::<RedemptionCode>().is_err());
        assert!("1234567".parse::<RedemptionCode>().is_err());
        assert!("12a456".parse::<RedemptionCode>().is_err());
        assert!("+12345".parse::<RedemptionCode>().is_err());
    }

    #[test]
    fn test_code_serde() {
        let code: RedemptionCode = serde_json::from_str("\"654321\"").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"654321\"");
        assert!(serde_json::from_str::<RedemptionCode>("\"abc\"").is_err());
    }

    #[test]
    fn test_chi_square_goodness_of_fit() {
        let selector = PrizeSelector::default();
        let catalog = selector.catalog();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let n = 20_000;

        let mut observed = vec![0u32; catalog.len()];
        for _ in 0..n {
            observed[selector.draw(&mut rng).index] += 1;
        }

        let chi_square: f64 = observed
            .iter()
            .enumerate()
            .map(|(i, &o)| {
                let expected = catalog.probability(i).unwrap() * n as f64;
                (o as f64 - expected).powi(2) / expected
            })
            .sum();

        // 3 degrees of freedom, p = 0.001
        assert!(chi_square < 16.27, "chi-square {chi_square} for {observed:?}");
    }

    #[test]
    fn test_most_common_prize_frequency() {
        let selector = PrizeSelector::default();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 100_000;

        let hits = (0..n).filter(|_| selector.draw_index(&mut rng) == 0).count();
        let freq = hits as f64 / n as f64;
        assert!((freq - 0.50).abs() < 0.02, "observed {freq}");
    }
}

//! # Brand Database
//!
//! Database of affiliated companies and the product names sold under them,
//! together with the text-matching rules used to spot those names in
//! recognized packaging text. Served verbatim by `GET /brands/database`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::types::{BrandInfo, RiskLevel};

/// One company entry: the product names it sells, its category and risk tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandRecord {
    pub products: Vec<String>,
    pub category: String,
    pub risk_level: RiskLevel,
}

/// A product name found in recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandMatch {
    /// The product name that matched
    pub name: String,
    /// Key of the owning company in the database
    pub company: String,
    /// Match confidence: 0.9 for an exact substring, 0.8 for a word-wise match
    pub confidence: f64,
    pub category: String,
    pub risk_level: RiskLevel,
}

impl BrandMatch {
    pub fn to_info(&self) -> BrandInfo {
        BrandInfo {
            name: self.name.clone(),
            category: self.category.clone(),
            risk_level: self.risk_level,
        }
    }
}

/// Map of company key to [`BrandRecord`], with lookup helpers.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BrandDatabase {
    brands: BTreeMap<String, BrandRecord>,
}

fn record(products: &[&str], category: &str, risk_level: RiskLevel) -> BrandRecord {
    BrandRecord {
        products: products.iter().map(|p| p.to_string()).collect(),
        category: category.to_string(),
        risk_level,
    }
}

impl BrandDatabase {
    /// The built-in database of affiliated companies.
    pub fn builtin() -> Self {
        let mut brands = BTreeMap::new();
        brands.insert(
            "unilever".to_string(),
            record(
                &[
                    "dove", "rexona", "lux", "vaseline", "ponds", "lifebuoy", "clear", "sunsilk",
                    "tresemme", "rinso", "molto", "sunlight", "pepsodent", "close up", "blue band",
                    "royco", "bango", "sariwangi",
                ],
                "consumer_goods",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "nestle".to_string(),
            record(
                &[
                    "nescafe", "milo", "kitkat", "maggi", "dancow", "nestum", "pure life",
                    "carnation", "smarties", "aero", "crunch",
                ],
                "food_beverage",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "procter_gamble".to_string(),
            record(
                &[
                    "pampers", "pantene", "head shoulders", "rejoice", "oral-b", "gillette",
                    "always", "downy", "ambi pur", "tide", "ariel",
                ],
                "personal_care",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "coca_cola".to_string(),
            record(
                &["coca cola", "sprite", "fanta", "minute maid", "aquarius", "ades"],
                "beverages",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "pepsico".to_string(),
            record(
                &["pepsi", "lays", "cheetos", "quaker", "gatorade", "tropicana"],
                "food_beverage",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "loreal".to_string(),
            record(
                &[
                    "l'oreal paris",
                    "garnier",
                    "maybelline",
                    "nyx",
                    "vichy",
                    "la roche-posay",
                    "kerastase",
                    "matrix",
                ],
                "cosmetics",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "estee_lauder".to_string(),
            record(
                &[
                    "estee lauder",
                    "mac",
                    "clinique",
                    "bobbi brown",
                    "origins",
                    "aveda",
                    "too faced",
                ],
                "cosmetics",
                RiskLevel::High,
            ),
        );
        brands.insert(
            "kraft_heinz".to_string(),
            record(&["heinz", "kraft", "abc", "salsa"], "food", RiskLevel::Medium),
        );
        brands.insert(
            "mcdonalds".to_string(),
            record(&["mcdonalds", "mcd"], "fast_food", RiskLevel::High),
        );
        brands.insert(
            "starbucks".to_string(),
            record(&["starbucks"], "beverages", RiskLevel::Medium),
        );
        Self { brands }
    }

    /// Number of companies in the database.
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    pub fn get(&self, company: &str) -> Option<&BrandRecord> {
        self.brands.get(company)
    }

    /// Scan recognized text for a known product name.
    ///
    /// Exact substring matches win with confidence 0.9. Multi-word names also
    /// match when every word appears somewhere in the text (confidence 0.8),
    /// which tolerates OCR fragments splitting a name across lines.
    pub fn match_text(&self, text: &str) -> Option<BrandMatch> {
        let text = text.to_lowercase();
        for (company, entry) in &self.brands {
            for name in &entry.products {
                let confidence = if text.contains(name.as_str()) {
                    0.9
                } else if name.contains(' ') && name.split(' ').all(|word| text.contains(word)) {
                    0.8
                } else {
                    continue;
                };
                return Some(BrandMatch {
                    name: name.clone(),
                    company: company.clone(),
                    confidence,
                    category: entry.category.clone(),
                    risk_level: entry.risk_level,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_product_match() {
        let db = BrandDatabase::builtin();
        let m = db.match_text("NESCAFE classic instant coffee").unwrap();
        assert_eq!(m.name, "nescafe");
        assert_eq!(m.company, "nestle");
        assert_eq!(m.confidence, 0.9);
        assert_eq!(m.risk_level, RiskLevel::High);
    }

    #[test]
    fn word_wise_match_for_split_names() {
        let db = BrandDatabase::builtin();
        // OCR split the name across lines: both words present, not adjacent
        let m = db.match_text("estee cosmetics by lauder").unwrap();
        assert_eq!(m.name, "estee lauder");
        assert_eq!(m.confidence, 0.8);
    }

    #[test]
    fn medium_risk_tier_carried_through() {
        let db = BrandDatabase::builtin();
        let m = db.match_text("heinz tomato ketchup").unwrap();
        assert_eq!(m.company, "kraft_heinz");
        assert_eq!(m.to_info().risk_level, RiskLevel::Medium);
    }

    #[test]
    fn no_match_for_unrelated_text() {
        let db = BrandDatabase::builtin();
        assert!(db.match_text("teh botol sosro").is_none());
    }

    #[test]
    fn builtin_has_ten_companies() {
        let db = BrandDatabase::builtin();
        assert_eq!(db.len(), 10);
        assert!(!db.is_empty());
        assert!(db.get("unilever").unwrap().products.contains(&"dove".to_string()));
        assert!(db.get("no_such_company").is_none());
    }
}

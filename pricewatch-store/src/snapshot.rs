use pricewatch_core::records::{PromotionRecord, SellingRecord};
use pricewatch_core::repository::PriceStore;

/// Immutable in-memory record store.
///
/// Owns both record collections, populated exactly once before the
/// first query and never mutated afterwards. Everything else holds a
/// read-only view through the `PriceStore` trait.
pub struct PriceSnapshot {
    selling: Vec<SellingRecord>,
    promotions: Vec<PromotionRecord>,
}

impl PriceSnapshot {
    pub fn new(selling: Vec<SellingRecord>, promotions: Vec<PromotionRecord>) -> Self {
        Self {
            selling,
            promotions,
        }
    }

    pub fn selling_count(&self) -> usize {
        self.selling.len()
    }

    pub fn promotion_count(&self) -> usize {
        self.promotions.len()
    }
}

impl PriceStore for PriceSnapshot {
    fn selling_prices(&self) -> &[SellingRecord] {
        &self.selling
    }

    fn promotions(&self) -> &[PromotionRecord] {
        &self.promotions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pricewatch_core::records::OPEN_ENDED;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn selling(article: &str, price: &str) -> SellingRecord {
        SellingRecord {
            article_number: article.to_string(),
            article_date: date(2024, 1, 1),
            valid_from: date(2024, 1, 1),
            valid_to: OPEN_ENDED,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_by_article_filter_preserves_load_order() {
        let snapshot = PriceSnapshot::new(
            vec![
                selling("A1", "10.00"),
                selling("B2", "4.00"),
                selling("A1", "9.00"),
            ],
            vec![],
        );

        let prices: Vec<String> = snapshot
            .selling_prices_for("A1")
            .iter()
            .map(|r| r.price.to_string())
            .collect();
        assert_eq!(prices, vec!["10.00", "9.00"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let snapshot = PriceSnapshot::new(vec![], vec![]);
        assert!(snapshot.selling_prices_for("A1").is_empty());
        assert!(snapshot.promotions_for("A1").is_empty());
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel end date substituted at ingestion when a selling price has
/// no end date in the source.
pub const OPEN_ENDED: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(d) => d,
    None => panic!("invalid sentinel date"),
};

/// Status code marking a promotion as eligible for price resolution.
pub const ELIGIBLE_PROMOTION_STATUS: &str = "40";

/// A regular selling price for an article, valid over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellingRecord {
    pub article_number: String,
    pub article_date: NaiveDate,
    pub valid_from: NaiveDate,
    /// `OPEN_ENDED` when the source carried no end date
    pub valid_to: NaiveDate,
    pub price: Decimal,
}

/// A promotional price for an article, valid over a closed date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub article_number: String,
    pub article_date: NaiveDate,
    pub campaign_period: String,
    pub promotion_number: u32,
    pub description: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub status: String,
    pub original_price: Decimal,
    pub sale_price: Decimal,
}

impl PromotionRecord {
    /// Only promotions with status "40" participate in resolution,
    /// regardless of how valid their date range is.
    pub fn is_eligible(&self) -> bool {
        self.status == ELIGIBLE_PROMOTION_STATUS
    }
}

/// The lowest price found for an article over the lookback window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    pub article_number: String,
    pub lowest_price: Decimal,
    pub is_promo: bool,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl ResolvedPrice {
    /// Zero-price fallback returned when no record qualifies. The caller
    /// disambiguates "unknown article" from "known article, nothing
    /// active" via the catalog index, not via this value.
    pub fn fallback(article_number: &str, today: NaiveDate) -> Self {
        Self {
            article_number: article_number.to_string(),
            lowest_price: Decimal::new(0, 2),
            is_promo: false,
            valid_from: today,
            valid_to: today,
        }
    }

    /// True when this is the zero-price fallback value.
    pub fn is_fallback(&self) -> bool {
        self.lowest_price == Decimal::new(0, 2) && !self.is_promo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_promotion_eligibility() {
        let mut promo = PromotionRecord {
            article_number: "A1".to_string(),
            article_date: date(2024, 1, 1),
            campaign_period: "2024-W23".to_string(),
            promotion_number: 1001,
            description: "Summer promo".to_string(),
            valid_from: date(2024, 6, 1),
            valid_to: date(2024, 6, 15),
            status: "40".to_string(),
            original_price: Decimal::new(1000, 2),
            sale_price: Decimal::new(750, 2),
        };
        assert!(promo.is_eligible());

        promo.status = "10".to_string();
        assert!(!promo.is_eligible());
    }

    #[test]
    fn test_fallback_shape() {
        let today = date(2024, 6, 10);
        let fb = ResolvedPrice::fallback("A1", today);

        assert_eq!(fb.lowest_price, Decimal::new(0, 2));
        assert!(!fb.is_promo);
        assert_eq!(fb.valid_from, today);
        assert_eq!(fb.valid_to, today);
        assert!(fb.is_fallback());
    }
}

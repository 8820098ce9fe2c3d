use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::records::ResolvedPrice;
use crate::repository::PriceStore;
use crate::window::LookbackWindow;

/// Running best candidate while scanning an article's records.
#[derive(Clone, Copy)]
struct Candidate {
    price: Decimal,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
    is_promo: bool,
}

/// Resolves the lowest applicable price per article over the lookback
/// window. Constructed once at startup and shared read-only; every
/// invocation is a pure scan over the snapshot.
pub struct PriceResolver {
    store: Arc<dyn PriceStore>,
    window: LookbackWindow,
    /// Union of article numbers across both record kinds, fixed at
    /// construction. Lets callers tell "unknown article" apart from
    /// "known article with no active price".
    articles: BTreeSet<String>,
}

impl PriceResolver {
    pub fn new(store: Arc<dyn PriceStore>, window: LookbackWindow) -> Self {
        let articles: BTreeSet<String> = store
            .selling_prices()
            .iter()
            .map(|r| r.article_number.clone())
            .chain(store.promotions().iter().map(|r| r.article_number.clone()))
            .collect();

        Self {
            store,
            window,
            articles,
        }
    }

    /// All article numbers known to either record collection.
    pub fn article_numbers(&self) -> &BTreeSet<String> {
        &self.articles
    }

    pub fn knows_article(&self, article_number: &str) -> bool {
        self.articles.contains(article_number)
    }

    /// Lowest valid price for one article as of `today`.
    ///
    /// Total over its input domain: an unknown article, an article with
    /// nothing active in the window, and a malformed negative price all
    /// yield the zero-price fallback rather than an error.
    pub fn resolve(&self, article_number: &str, today: NaiveDate) -> ResolvedPrice {
        let mut best: Option<Candidate> = None;

        for record in self.store.selling_prices_for(article_number) {
            if !self
                .window
                .is_active(record.valid_from, record.valid_to, today)
            {
                continue;
            }
            // Strict < keeps the first-encountered record on a tie.
            if best.map_or(true, |b| record.price < b.price) {
                best = Some(Candidate {
                    price: record.price,
                    valid_from: record.valid_from,
                    valid_to: record.valid_to,
                    is_promo: false,
                });
            }
        }

        for record in self.store.promotions_for(article_number) {
            if !record.is_eligible() {
                continue;
            }
            if !self
                .window
                .is_active(record.valid_from, record.valid_to, today)
            {
                continue;
            }
            // Promotions are scanned second, so an equal sale price never
            // flips a regular price to promotional.
            if best.map_or(true, |b| record.sale_price < b.price) {
                best = Some(Candidate {
                    price: record.sale_price,
                    valid_from: record.valid_from,
                    valid_to: record.valid_to,
                    is_promo: true,
                });
            }
        }

        match best {
            // Guard against malformed negative prices that survived
            // ingestion: discard the findings entirely.
            Some(b) if b.price < Decimal::ZERO => ResolvedPrice::fallback(article_number, today),
            Some(b) => ResolvedPrice {
                article_number: article_number.to_string(),
                lowest_price: b.price,
                is_promo: b.is_promo,
                valid_from: b.valid_from,
                valid_to: b.valid_to,
            },
            None => ResolvedPrice::fallback(article_number, today),
        }
    }

    /// Lowest price for every known article, one entry per catalog
    /// index member. Follows the index's article-number order.
    pub fn resolve_all(&self, today: NaiveDate) -> Vec<ResolvedPrice> {
        tracing::debug!(
            articles = self.articles.len(),
            %today,
            "resolving lowest prices for all articles"
        );

        self.articles
            .iter()
            .map(|article_number| self.resolve(article_number, today))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PromotionRecord, SellingRecord, OPEN_ENDED};

    struct FixtureStore {
        selling: Vec<SellingRecord>,
        promotions: Vec<PromotionRecord>,
    }

    impl PriceStore for FixtureStore {
        fn selling_prices(&self) -> &[SellingRecord] {
            &self.selling
        }

        fn promotions(&self) -> &[PromotionRecord] {
            &self.promotions
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn selling(article: &str, from: NaiveDate, to: NaiveDate, price: &str) -> SellingRecord {
        SellingRecord {
            article_number: article.to_string(),
            article_date: date(2024, 1, 1),
            valid_from: from,
            valid_to: to,
            price: price.parse().unwrap(),
        }
    }

    fn promotion(
        article: &str,
        from: NaiveDate,
        to: NaiveDate,
        status: &str,
        sale_price: &str,
    ) -> PromotionRecord {
        PromotionRecord {
            article_number: article.to_string(),
            article_date: date(2024, 1, 1),
            campaign_period: "2024-P06".to_string(),
            promotion_number: 9001,
            description: "test promotion".to_string(),
            valid_from: from,
            valid_to: to,
            status: status.to_string(),
            original_price: "99.99".parse().unwrap(),
            sale_price: sale_price.parse().unwrap(),
        }
    }

    fn resolver(selling: Vec<SellingRecord>, promotions: Vec<PromotionRecord>) -> PriceResolver {
        let store = Arc::new(FixtureStore {
            selling,
            promotions,
        });
        PriceResolver::new(store, LookbackWindow::default())
    }

    #[test]
    fn test_unknown_article_yields_fallback() {
        let resolver = resolver(vec![], vec![]);
        let today = date(2024, 6, 10);

        let result = resolver.resolve("NOPE", today);
        assert_eq!(result, ResolvedPrice::fallback("NOPE", today));
        assert!(!resolver.knows_article("NOPE"));
    }

    #[test]
    fn test_minimum_regular_price_wins() {
        let resolver = resolver(
            vec![
                selling("A1", date(2024, 1, 1), OPEN_ENDED, "12.00"),
                selling("A1", date(2024, 5, 1), date(2024, 7, 1), "9.50"),
                selling("A1", date(2024, 5, 15), date(2024, 6, 30), "11.00"),
            ],
            vec![],
        );

        let result = resolver.resolve("A1", date(2024, 6, 10));
        assert_eq!(result.lowest_price, "9.50".parse::<Decimal>().unwrap());
        assert!(!result.is_promo);
        assert_eq!(result.valid_from, date(2024, 5, 1));
        assert_eq!(result.valid_to, date(2024, 7, 1));
    }

    #[test]
    fn test_cheaper_promotion_overrides_regular() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), OPEN_ENDED, "10.00")],
            vec![promotion(
                "A1",
                date(2024, 6, 1),
                date(2024, 6, 15),
                "40",
                "7.50",
            )],
        );

        let result = resolver.resolve("A1", date(2024, 6, 10));
        assert_eq!(result.lowest_price, "7.50".parse::<Decimal>().unwrap());
        assert!(result.is_promo);
        assert_eq!(result.valid_from, date(2024, 6, 1));
        assert_eq!(result.valid_to, date(2024, 6, 15));
    }

    #[test]
    fn test_expired_promotion_falls_back_to_regular() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), OPEN_ENDED, "10.00")],
            vec![promotion(
                "A1",
                date(2024, 6, 1),
                date(2024, 6, 15),
                "40",
                "7.50",
            )],
        );

        // Promotion ended more than 30 days before the reference date.
        let result = resolver.resolve("A1", date(2024, 8, 1));
        assert_eq!(result.lowest_price, "10.00".parse::<Decimal>().unwrap());
        assert!(!result.is_promo);
    }

    #[test]
    fn test_ineligible_status_never_selected() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), OPEN_ENDED, "10.00")],
            vec![promotion(
                "A1",
                date(2024, 6, 1),
                date(2024, 6, 15),
                "20",
                "0.01",
            )],
        );

        let result = resolver.resolve("A1", date(2024, 6, 10));
        assert_eq!(result.lowest_price, "10.00".parse::<Decimal>().unwrap());
        assert!(!result.is_promo);
    }

    #[test]
    fn test_equal_prices_keep_regular_precedence() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), OPEN_ENDED, "7.50")],
            vec![promotion(
                "A1",
                date(2024, 6, 1),
                date(2024, 6, 15),
                "40",
                "7.50",
            )],
        );

        let result = resolver.resolve("A1", date(2024, 6, 10));
        assert_eq!(result.lowest_price, "7.50".parse::<Decimal>().unwrap());
        assert!(!result.is_promo);
    }

    #[test]
    fn test_equal_regular_prices_keep_first_encountered() {
        let resolver = resolver(
            vec![
                selling("A1", date(2024, 5, 1), date(2024, 7, 1), "8.00"),
                selling("A1", date(2024, 6, 1), date(2024, 6, 30), "8.00"),
            ],
            vec![],
        );

        let result = resolver.resolve("A1", date(2024, 6, 10));
        assert_eq!(result.valid_from, date(2024, 5, 1));
        assert_eq!(result.valid_to, date(2024, 7, 1));
    }

    #[test]
    fn test_window_lower_boundary_inclusive() {
        let today = date(2024, 6, 30);
        let resolver = resolver(
            vec![
                // Ends exactly at today - 30 days: still counts.
                selling("A1", date(2024, 5, 1), date(2024, 5, 31), "6.00"),
                selling("A1", date(2024, 6, 1), OPEN_ENDED, "9.00"),
            ],
            vec![],
        );

        let result = resolver.resolve("A1", today);
        assert_eq!(result.lowest_price, "6.00".parse::<Decimal>().unwrap());

        // One day earlier and the cheap record drops out.
        let resolver = resolver_with_shifted_end();
        let result = resolver.resolve("A1", today);
        assert_eq!(result.lowest_price, "9.00".parse::<Decimal>().unwrap());
    }

    fn resolver_with_shifted_end() -> PriceResolver {
        resolver(
            vec![
                selling("A1", date(2024, 5, 1), date(2024, 5, 30), "6.00"),
                selling("A1", date(2024, 6, 1), OPEN_ENDED, "9.00"),
            ],
            vec![],
        )
    }

    #[test]
    fn test_negative_price_guard() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), OPEN_ENDED, "-4.00")],
            vec![],
        );
        let today = date(2024, 6, 10);

        let result = resolver.resolve("A1", today);
        assert_eq!(result, ResolvedPrice::fallback("A1", today));
    }

    #[test]
    fn test_known_article_without_active_price_is_fallback_but_known() {
        let resolver = resolver(
            vec![selling("A1", date(2024, 1, 1), date(2024, 2, 1), "10.00")],
            vec![],
        );
        let today = date(2024, 6, 10);

        let result = resolver.resolve("A1", today);
        assert!(result.is_fallback());
        assert!(resolver.knows_article("A1"));
    }

    #[test]
    fn test_resolve_all_covers_index_exactly_once() {
        let resolver = resolver(
            vec![
                selling("A1", date(2024, 1, 1), OPEN_ENDED, "10.00"),
                selling("A1", date(2024, 2, 1), OPEN_ENDED, "11.00"),
                selling("B2", date(2024, 1, 1), OPEN_ENDED, "5.00"),
            ],
            vec![promotion(
                "C3",
                date(2024, 6, 1),
                date(2024, 6, 15),
                "40",
                "2.00",
            )],
        );

        let results = resolver.resolve_all(date(2024, 6, 10));
        let articles: Vec<&str> = results.iter().map(|r| r.article_number.as_str()).collect();

        assert_eq!(articles, vec!["A1", "B2", "C3"]);
        assert_eq!(resolver.article_numbers().len(), 3);
    }
}

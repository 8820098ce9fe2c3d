use crate::records::{PromotionRecord, SellingRecord};

/// Capability trait for price record access.
///
/// All operations are pure reads over an immutable snapshot; no match
/// yields an empty collection, never an error. The by-article filters
/// must preserve load order, which the resolver's tie-break depends on.
/// Swappable backends (a future database-backed store) implement the
/// same four operations.
pub trait PriceStore: Send + Sync {
    /// Every selling price record, in load order.
    fn selling_prices(&self) -> &[SellingRecord];

    /// Every promotion record, in load order.
    fn promotions(&self) -> &[PromotionRecord];

    /// Selling prices for one article, in load order.
    fn selling_prices_for(&self, article_number: &str) -> Vec<&SellingRecord> {
        self.selling_prices()
            .iter()
            .filter(|r| r.article_number == article_number)
            .collect()
    }

    /// Promotions for one article, in load order.
    fn promotions_for(&self, article_number: &str) -> Vec<&PromotionRecord> {
        self.promotions()
            .iter()
            .filter(|r| r.article_number == article_number)
            .collect()
    }
}

use pricewatch_core::PriceResolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PriceResolver>,
}

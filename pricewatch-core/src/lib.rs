pub mod records;
pub mod repository;
pub mod resolver;
pub mod window;

pub use records::{PromotionRecord, ResolvedPrice, SellingRecord};
pub use repository::PriceStore;
pub use resolver::PriceResolver;
pub use window::LookbackWindow;

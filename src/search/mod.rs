pub mod context;
pub mod eval;
pub mod ordering;
pub mod pesto;
pub mod picker;
pub mod search;
pub mod see;
pub mod tt;

pub use context::SearchContext;
pub use search::{TimeManager, search, search_with_time};
pub use tt::TranspositionTable;

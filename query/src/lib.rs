pub mod index;

pub use index::{EntitySummary, GraphIndex};

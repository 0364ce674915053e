//! Reference vertex programs
//!
//! - [`PageRank`]: iterative fixed-point rank propagation (synchronous, sum)
//! - [`MinLabelComponents`]: minimum-label propagation (min, either mode)

mod components;
mod page_rank;

pub use components::MinLabelComponents;
pub use page_rank::PageRank;

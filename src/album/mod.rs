pub mod aggregator;
pub mod post;

pub use aggregator::{Aggregation, GroupAggregator, GroupedMessage};
pub use post::{IncomingPost, primary_text};

pub mod drama;

pub use drama::{AggregateFeed, CdnEntry, DramaCard, QualityOption, QualitySelection};

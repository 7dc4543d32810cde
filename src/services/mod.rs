pub mod aggregator;
pub mod upstream;

pub mod aggregator;
pub mod controller;
pub mod dashboard;
pub mod parse;
pub mod snapshot;
pub mod symbols;

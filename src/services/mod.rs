pub mod discovery;
pub mod ingestion;
pub mod persistence;
pub mod recommendations;

pub use recommendations::RecommendationEngine;

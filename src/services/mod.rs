pub mod aggregate;
pub mod features;
pub mod model;
pub mod providers;
pub mod ranking;
pub mod recommendations;
pub mod report;

pub use providers::{AniListProvider, CatalogProvider};
pub use recommendations::{get_recommendations, TrainedScorer};

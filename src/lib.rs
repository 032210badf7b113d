pub mod catalog;
pub mod dedup;
pub mod dto;
pub mod error;
pub mod normalize;
pub mod options;
pub mod recommend;
pub mod response;
pub mod similarity;
pub mod util;

pub use dedup::find_service_duplicates;
pub use recommend::generate_duplicate_recommendations;

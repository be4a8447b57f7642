pub mod building;
pub mod coordinate;
pub mod data_url;
pub mod error;
pub mod gps;
pub mod metadata;

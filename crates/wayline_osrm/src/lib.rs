pub mod batch;
pub mod client;
pub mod error;
pub mod latlng;
pub mod od_table;
pub mod profile;
pub mod travel_matrix;

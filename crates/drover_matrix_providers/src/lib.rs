pub mod great_circle;
pub mod matrix_api;
pub mod travel_matrix;
pub mod travel_matrix_client;

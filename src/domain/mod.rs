pub mod errors;
pub mod interfaces;
pub mod models;
pub mod patterns;

pub mod driver;
pub mod persistence;

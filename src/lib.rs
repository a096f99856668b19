pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod logging;
pub mod usecase;

pub mod repository;
pub mod schema;

pub use schema::{Table, create_schema};

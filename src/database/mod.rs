pub mod manager;
pub mod models;
pub mod query_builder;
pub mod schema;
pub mod seed;

pub use manager::DatabaseError;
pub use query_builder::QueryBuilder;

pub mod config;
pub mod db;
pub mod errors;
pub mod json;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod source;
pub mod store;

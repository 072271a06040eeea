pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod schemas;
pub mod seed;
pub mod state;

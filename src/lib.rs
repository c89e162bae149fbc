pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod docs;
pub mod form;
pub mod leave;
pub mod model;
pub mod models;
pub mod routes;
pub mod utils;

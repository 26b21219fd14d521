pub mod affiliation;
pub mod age;
pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod form;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod plans;
pub mod schema;
pub mod storage;
pub mod store;
pub mod viewer;

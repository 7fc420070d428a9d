pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod form;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod store;

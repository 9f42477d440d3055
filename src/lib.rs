pub mod commands;
pub mod config;
pub mod fs;
pub mod logging;
pub mod models;
pub mod mutation;
pub mod ordering;
pub mod progress;
pub mod reorder;
pub mod service;
pub mod store;
pub mod validation;

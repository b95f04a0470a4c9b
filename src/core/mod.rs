//! Configuration and shared domain types

pub mod config;
pub mod models;

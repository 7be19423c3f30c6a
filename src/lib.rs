pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod infrastructure;
pub mod interfaces;
pub mod state;

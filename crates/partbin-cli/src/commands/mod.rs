//! Command handlers

pub mod auth;
pub mod component;
pub mod config;
pub mod status;
pub mod sync;

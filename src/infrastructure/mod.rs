//! Infrastructure layer - store adapters and team services

pub mod auth;
pub mod blob;
pub mod document;
pub mod logging;
pub mod team;

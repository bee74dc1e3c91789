//! HTTP request handlers for the wind API.

pub mod common;
pub mod health;
pub mod position;
pub mod tiles;

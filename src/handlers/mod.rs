//! HTTP handlers

pub mod classify;
pub mod health;
pub mod page;

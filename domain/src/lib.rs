//! Business rules for the connect platform: the connection-request state
//! machine, the notification store, and identity resolution.
//!
//! This module re-exports various items from the `entity_api` crate so that
//! consumers of the `domain` crate do not need to directly depend on
//! `entity_api`. The `web` layer works exclusively against this crate.

pub use entity_api::QueryFilterMap;

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{connection_requests, connections, notifications, status, users, Id};

pub mod connection;
pub mod connection_request;
pub mod error;
pub mod jwt;
pub mod notification;
pub mod user;

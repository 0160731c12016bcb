//! WebSocket handler for the live notification channel.
//!
//! This module contains only the axum handler for the session gateway.
//! The routing infrastructure (Manager, SessionRegistry, wire message types)
//! lives in the `push` crate to avoid circular dependencies.

pub mod handler;

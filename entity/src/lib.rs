use uuid::Uuid;

pub mod prelude;

// Core entities
pub mod connection_requests;
pub mod connections;
pub mod jwt;
pub mod notifications;
pub mod status;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

pub use error::Error;
pub(crate) use service::AppState;

mod controller;
mod error;
mod extractors;
mod live;
mod params;
pub mod router;

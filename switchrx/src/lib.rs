mod async_state;
mod coalescer;
mod config;
mod error;
mod stream_ext;
mod subject;
pub mod mock;

pub use async_state::*;
pub use coalescer::*;
pub use config::*;
pub use error::*;
pub use stream_ext::*;
pub use subject::*;

pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod unit_tests;

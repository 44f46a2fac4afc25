pub mod config;
pub mod driver;
mod error;
pub mod reconcile;
pub mod remote;
pub mod snapshot;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod trace;
pub mod zone;

pub use error::{Error, Result};

#[macro_use]
extern crate tracing;

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

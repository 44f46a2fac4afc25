pub mod http;
mod server;

// re-export
pub use server::{Handler, MockServer, RecordedRequest};

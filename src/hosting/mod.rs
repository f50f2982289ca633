//! Match registry and the HTTP/WebSocket surface in front of it.
mod registry;
pub use registry::*;

#[cfg(feature = "server")]
mod bridge;
#[cfg(feature = "server")]
mod dto;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod server;

#[cfg(feature = "server")]
pub use bridge::*;
#[cfg(feature = "server")]
pub use dto::*;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use server::*;

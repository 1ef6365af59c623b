pub mod error;
pub mod observer;
pub mod registry;

#[cfg(test)]
mod tests;

pub use error::HostError;
pub use observer::{EventSink, ObserverId, SinkClosed};
pub use registry::{GameId, HostedGame, Registry};

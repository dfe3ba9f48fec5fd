//! Upstream adapters (stock sources) and delivery adapters (notifiers).
pub mod console;
pub mod discord;
pub mod discovery;
pub mod error;
pub mod failover;
pub mod http;
pub mod payload;
pub mod sim;

pub use console::LogNotifier;
pub use discord::DiscordNotifier;
pub use discovery::{CandidateResolver, DiscoveringSource, EndpointResolver};
pub use error::{DeliveryError, SourceError};
pub use failover::FailoverSource;
pub use http::{HttpSource, build_client};
pub use payload::{ItemQuery, ItemRecord};
pub use sim::{SimCycle, SimulatedSource};

#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Restock monitor core (transport-agnostic).
//!
//! All I/O goes through `finwatch_traits::StockSource`,
//! `finwatch_traits::Notifier` and `finwatch_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Cycle**: `Available ⇄ Depleted` edge detection (`cycle` module)
//! - **Prediction**: bounded delay history, mean delay, damped calibration
//!   against authoritative restock times (`prediction` module)
//! - **Timing**: warn / depart / landing instants and windows (`timing` module)
//! - **Notification flags**: once-per-cycle gating and restart recovery (`notify` module)
//! - **Orchestration**: one `Monitor::tick` per poll (`monitor` module)
//! - **Rendering**: alert → message (`render` module)

pub mod alert;
pub mod config;
pub mod conversions;
pub mod cycle;
pub mod error;
pub mod mocks;
pub mod monitor;
pub mod notify;
pub mod prediction;
pub mod render;
pub mod state;
pub mod timing;
pub mod util;

pub use alert::{Alert, AlertKind};
pub use config::{MonitorCfg, PredictionCfg, TimingCfg};
pub use cycle::{Edge, StockPhase, Transition};
pub use error::{BuildError, MonitorError};
pub use monitor::{Monitor, TickOutcome, TickReport};
pub use notify::{NotificationFlags, TimedAlert};
pub use prediction::{Calibration, CycleRecord, PredictionEngine};
pub use render::{Renderer, TimeStyle};
pub use state::MonitorState;
pub use timing::{Schedule, Window};

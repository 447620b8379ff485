//! Agent-based market microstructure simulation.
//!
//! A population of heterogeneous agents trades through the
//! [`agora_exchange::MatchingEngine`] over a discretised trading day. The
//! [`MarketScheduler`] actuates every agent once per timestep in randomised
//! order; the [`SimulationDriver`] rotates whole runs and their output files.

pub mod agents;
pub mod config;
pub mod driver;
pub mod reporting;
pub mod scheduler;

pub use agents::{Agent, AgentError, TraderState};
pub use config::{Population, SimulationConfig};
pub use driver::{SimulationDriver, SimulationError};
pub use reporting::CsvReportingSink;
pub use scheduler::{MarketScheduler, SimulationMetrics};

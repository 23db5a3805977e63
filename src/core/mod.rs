pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::SimClock;
pub use config::{GeometryConfig, RulesFile};
pub use error::{DismemberError, Result};

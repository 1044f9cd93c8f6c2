pub mod config;
pub mod control;
pub mod curve;
pub mod error;
pub mod io;
pub mod logger;
pub mod nav;
pub mod sim;
pub mod vehicle;

pub use config::FlightControlConfig;
pub use control::{FlightControl, FlightMode, TickStatus};
pub use error::{FlightControlError, FlightResult};

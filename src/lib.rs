pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::memory::InMemorySlotRepository;
pub use app::{ParkingApp, Request};
pub use config::toml_config::ParkingConfig;
pub use core::{geo::GeoRadiusTranslator, occupancy::SlotOccupancyService};
pub use utils::error::{ParkingError, Result};

// Domain layer: slot model and the ports the core talks through.

pub mod model;
pub mod ports;

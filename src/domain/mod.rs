// Domain layer: wire-facing models and the async ports the core talks through.

pub mod model;
pub mod ports;

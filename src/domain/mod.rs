// Domain layer: contract model, identifier and currency rules, ports.

pub mod consistency;
pub mod currency;
pub mod identifier;
pub mod model;
pub mod ports;

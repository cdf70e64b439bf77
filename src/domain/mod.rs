// Domain layer: data model and ports. No I/O here.

pub mod catalog;
pub mod model;
pub mod ports;
pub mod snapshot;

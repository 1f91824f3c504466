// Domain layer: models, the packed e-paper frame and the ports adapters implement.

pub mod frame;
pub mod model;
pub mod ports;

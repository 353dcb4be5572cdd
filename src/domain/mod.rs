// Domain layer: repository and paper models plus the ports the pipeline is written against.

pub mod model;
pub mod ports;

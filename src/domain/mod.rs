// Domain layer: resource model and ports (collaborator interfaces).

pub mod model;
pub mod ports;

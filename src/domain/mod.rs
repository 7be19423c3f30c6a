//! Domain layer: entities, value objects and the ports the application
//! services depend on. Nothing here touches the network or the filesystem.

pub mod course;
pub mod enrollment;
pub mod money;
pub mod ports;
pub mod user;

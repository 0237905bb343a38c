//! External plant-database clients
//!
//! One adapter per upstream source. Each adapter normalizes its
//! provider's response shape into the canonical record so downstream
//! code never branches on the source.

pub mod care_guide;
pub mod perenual;
pub mod trefle;

pub use perenual::PerenualClient;
pub use trefle::TrefleClient;

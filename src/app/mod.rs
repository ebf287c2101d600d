//! Hexagonal application core: port traits, structured events, and the
//! top-level [`Coordinator`](service::Coordinator).

pub mod events;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod mock;

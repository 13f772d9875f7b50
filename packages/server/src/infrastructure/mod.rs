//! Infrastructure layer: store, transport and wire-format implementations.

pub mod delivery;
pub mod dto;
pub mod repository;

// src/adapter/mod.rs
pub mod coordinator;

pub use coordinator::PosCoordinator;

//! Application layer: drives the domain state machine through the transport
//! and audio capabilities.

pub mod controller;

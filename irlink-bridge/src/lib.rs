//! # irlink-bridge — IR transceiver as Home Assistant entities
//!
//! Runs a [`SignalController`](irlink_core::SignalController) against
//! the in-process loopback broker and a simulated transceiver, driven
//! from the console.
//!
//! ## Modules
//!
//! - **config**: TOML configuration (`[controller]`, `[simulator]`, `[logging]`)
//! - **simulated**: `SimulatedIr`, an `IrModule` with scripted captures
//! - **console**: stdin commands in, publications out

pub mod config;
pub mod console;
pub mod simulated;

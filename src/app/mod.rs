//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the ShockShadow device:
//! shock alerting, periodic shadow reporting, delta-driven actuation, and
//! inbound message routing. All interaction with hardware and the broker
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod connect;
pub mod dispatch;
pub mod events;
pub mod ports;
pub mod runtime;
pub mod state;
pub mod sync;

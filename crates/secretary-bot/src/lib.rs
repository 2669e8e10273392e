//! Admission and eviction policy engine for the in-game secretary appointment screen.
//!
//! The crate consumes screen capture, template matching, OCR and input injection through the
//! traits in [`device`]; the routine in [`workflows::secretary`] decides what to tap.

pub mod config;
pub mod device;
pub mod error;
pub mod simulator;
pub mod telemetry;
pub mod workflows;

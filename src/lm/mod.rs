//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the damped least-squares optimizer used by the fit
//! engine, together with its configuration.

pub mod algorithm;
pub mod config;

pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;

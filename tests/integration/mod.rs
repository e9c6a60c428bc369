//! Integration tests for fitlab-rs

mod estimators;
mod fit_engine;
mod formula_safety;
mod workflows;

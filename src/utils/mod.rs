//! Utility functions and helpers for the fitlab-rs library.

pub mod finite_difference;
pub mod format;
pub mod matrix_convert;

pub use format::{format_parameter, format_significant};
pub use matrix_convert::{
    nalgebra_to_ndarray, nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

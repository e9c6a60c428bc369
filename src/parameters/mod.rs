//! Parameter bounds and the transforms that enforce them during optimization.

pub mod bounds;

pub use bounds::{Bounds, BoundsTransform};

//! Acoustic model implementations.

pub mod onnx;

pub use onnx::{OnnxConfig, OnnxModel};

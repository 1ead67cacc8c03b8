//! Chart-to-catalog reconciliation library - shared modules for the binary.

pub mod catalog;
pub mod chart;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod reconcile;
pub mod safety;
pub mod scoring;

#[cfg(test)]
mod test_utils;

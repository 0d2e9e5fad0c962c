//! Utility helpers

pub mod helpers;

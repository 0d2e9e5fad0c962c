//! Terminal front end for the CLI binary

pub mod interactive;

pub use interactive::{print_detection, print_outcome, select_coupon, spinner};

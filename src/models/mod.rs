//! Core data models shared by the extension contexts

pub mod coupon;
pub mod manifest;
pub mod messages;

pub use coupon::*;
pub use manifest::*;
pub use messages::*;

//! The three extension contexts
//!
//! Background and popup only send messages; the content agent is the only
//! one that answers.

pub mod background;
pub mod content;
pub mod popup;

pub use background::BackgroundAgent;
pub use content::{ContentAgent, ContentHandle};
pub use popup::{Notice, PopupController, PopupState};

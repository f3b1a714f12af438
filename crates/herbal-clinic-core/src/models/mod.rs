//! Domain models for the herbal clinic backend.

mod notification;
mod order;
mod patient;
mod visit;

pub use notification::*;
pub use order::*;
pub use patient::*;
pub use visit::*;

//! Endpoint-based input and output surfaces

pub mod input;
pub mod observer;

pub use input::InputChannel;
pub use observer::MessageObserver;

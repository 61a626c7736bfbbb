//! HTTP middleware stack.

pub mod session;

pub use session::create_session_layer;

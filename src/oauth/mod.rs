//! OAuth building blocks: request signing, host decoding, code exchange.

pub mod exchange;
pub mod hmac;
pub mod host;

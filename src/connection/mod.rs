//! Connection lifecycle, command surface and envelope delivery

mod client;
mod receiver;


pub use client::Client;
pub use receiver::EnvelopeReceiver;

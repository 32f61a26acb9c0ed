//! Inbound adapters translating HTTP requests into calls on the driving
//! ports. Framework details stay here; handlers never touch repositories.

pub mod http;

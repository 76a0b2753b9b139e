//! Chat-platform abstractions. The platform itself lives behind
//! [`port::MessagingPort`].

pub mod port;
pub mod types;

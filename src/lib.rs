//! A word server that hands out chunks of a shared word sequence to many
//! clients at once, arbitrating between them with a pluggable scheduling
//! policy (first-come-first-served or round-robin).

mod collections;
pub mod client;
pub mod config;
pub mod error;
pub mod fairness;
pub mod network;
pub mod policy;
pub mod protocol;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use network::Server;
pub use policy::{Backlog, Policy, PolicyKind};
pub use store::WordStore;
pub use types::{Request, SessionId};

mod prelude {
    pub(crate) use crate::collections::*;
    pub(crate) use crate::error::{Error, Result};
    pub(crate) use crate::policy::Backlog;
    pub(crate) use crate::types::*;
    pub(crate) use std::{io, time};
    pub(crate) use std::net::TcpStream;
}

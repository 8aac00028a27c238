#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod attachment;
pub mod auth;
pub mod companion;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod message;
pub mod remote;
pub mod session;
pub mod view;

pub use error::{Error, Result};

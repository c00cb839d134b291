#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod callable;
pub mod config;
pub mod error;
pub mod identity;
pub mod mail;
pub mod routes;
pub mod templates;
pub mod triggers;

pub use callable::{Functions, Settings};
pub use error::FunctionError;

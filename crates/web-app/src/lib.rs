#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod chart;
pub mod log;
pub mod service_worker;

mod service;
mod settings;

pub use service::*;
pub use settings::*;

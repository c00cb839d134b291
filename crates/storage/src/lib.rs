#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod auth;
pub mod cached;
pub mod firebase;
pub mod firestore;
pub mod functions;
pub mod http;
pub mod local_storage;
pub mod object_storage;

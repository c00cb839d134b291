#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

/// Document identifiers are opaque strings assigned by the document store or the auth provider.
macro_rules! document_id {
    ($(#[$attr:meta])* $name: ident) => {
        $(#[$attr])*
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
        )]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            #[must_use]
            pub fn nil() -> Self {
                Self(String::new())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

mod assigned_table;
mod batch;
mod category;
mod config;
mod error;
mod exercise;
mod feedback;
mod functions;
mod history;
mod machine;
mod media;
mod post;
mod service;
mod session;
mod user;
mod value;
mod workout;

pub use assigned_table::*;
pub use batch::*;
pub use category::*;
pub use config::*;
pub use error::*;
pub use exercise::*;
pub use feedback::*;
pub use functions::*;
pub use history::*;
pub use machine::*;
pub use media::*;
pub use post::*;
pub use service::*;
pub use session::*;
pub use user::*;
pub use value::*;
pub use workout::*;

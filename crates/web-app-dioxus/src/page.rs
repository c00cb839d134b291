pub mod admin;
pub mod feedback;
pub mod history;
pub mod home;
pub mod login;
pub mod machine;
pub mod machines;
pub mod not_found;
pub mod profile;
pub mod root;
pub mod table;

pub mod contact;
pub mod discovery;
pub mod events;
pub mod gallery;
pub mod projects;

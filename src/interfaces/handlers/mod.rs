pub mod contact;
pub mod events;
pub mod home;
pub mod images;
pub mod json_error;
pub mod projects;
pub mod system;

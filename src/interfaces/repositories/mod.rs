pub mod contact;
pub mod event;
pub mod memory;
pub mod project;
pub mod sqlx_repo;

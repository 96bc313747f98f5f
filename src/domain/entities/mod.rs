pub mod contact;
pub mod event;
pub mod gallery;
pub mod option_fields;
pub mod pagination;
pub mod project;
pub mod validation;

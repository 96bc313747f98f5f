pub mod get_client_ip;
pub mod sandbox;
pub mod valid_uuid;

pub mod db;
pub mod email;
pub mod limiter;
pub mod probe;
pub mod utils;

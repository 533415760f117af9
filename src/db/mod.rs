pub mod connect;

pub use connect::{connection_password, pg_connect, pg_connect_options};

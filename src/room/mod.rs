pub mod connection;
pub mod relay;

pub use connection::{Audience, Connection, ConnectionSet, Delivery};
pub use relay::Relay;

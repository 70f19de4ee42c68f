pub mod foxess;
pub mod heartbeat;

pub mod init;

pub use init::{init_telemetry, json_requested};

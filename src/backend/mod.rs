//! Build-backend commands and the gateway that executes them.

pub mod command;
pub mod gateway;
pub mod http;

pub use command::BackendCommand;
pub use gateway::{BackendError, BackendGateway, BackendReply, RecordingBackend};
pub use http::HttpBackend;

pub mod bridge;
pub mod capabilities;
mod command;
pub mod connection;
mod event;
pub mod jsonrpc;
pub mod navigation;

pub use bridge::PositionBridge;
pub use command::LspCommand;
pub use connection::{
  ChannelConnection,
  ConnectionConfig,
  ConnectionError,
  LspConnection,
};
pub use event::LspEvent;

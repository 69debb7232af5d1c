use crate::{
  capabilities::ServerCapabilitiesSnapshot,
  command::LspCommand,
  navigation::LspLocation,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LspEvent {
  /// The server answered `initialize`; the document has been opened.
  Initialized {
    capabilities: ServerCapabilitiesSnapshot,
  },
  /// Candidate locations for a navigation request, in server order.
  GoTo {
    command:   LspCommand,
    locations: Vec<LspLocation>,
  },
  /// The transport went away. No further events follow.
  Closed,
}

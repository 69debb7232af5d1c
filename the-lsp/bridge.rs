//! LSP Position Bridge: applies a document connection's `goTo` results to
//! the jumper that owns the document.
//!
//! Targets in the bridged document become a local caret move without a
//! history entry, since the server already resolved the symbol and the user
//! did not navigate by name. Targets elsewhere are handed to the host as
//! external references.

use ropey::RopeSlice;
use the_core::uri::{
  same_document,
  strip_file_scheme,
};
use the_lib::{
  jump::GlobalJumpTarget,
  jumper::CodeJumper,
  position::Position,
};
use tracing::debug;

use crate::{
  LspCommand,
  LspEvent,
  capabilities::ServerCapabilitiesSnapshot,
  connection::{
    ConnectionError,
    LspConnection,
  },
  navigation::{
    LspLocation,
    from_lsp_position,
    to_lsp_position,
  },
};

pub struct PositionBridge {
  connection: Box<dyn LspConnection>,
}

impl PositionBridge {
  pub fn new(connection: Box<dyn LspConnection>) -> Self {
    Self { connection }
  }

  pub fn connection(&self) -> &dyn LspConnection {
    self.connection.as_ref()
  }

  pub fn document_uri(&self) -> &str {
    self.connection.config().document_uri()
  }

  pub fn capabilities(&self) -> Option<&ServerCapabilitiesSnapshot> {
    self.connection.capabilities()
  }

  pub fn is_definition_supported(&self) -> bool {
    self
      .capabilities()
      .is_some_and(ServerCapabilitiesSnapshot::is_definition_supported)
  }

  pub fn is_type_definition_supported(&self) -> bool {
    self
      .capabilities()
      .is_some_and(ServerCapabilitiesSnapshot::is_type_definition_supported)
  }

  pub fn is_references_supported(&self) -> bool {
    self
      .capabilities()
      .is_some_and(ServerCapabilitiesSnapshot::is_references_supported)
  }

  pub fn is_supported(&self, command: LspCommand) -> bool {
    self
      .capabilities()
      .is_some_and(|capabilities| capabilities.supports(command.capability()))
  }

  /// Sends `command` for `position` in `text`. Callers gate on
  /// [`Self::is_supported`] first.
  pub fn request(
    &mut self,
    command: LspCommand,
    text: RopeSlice,
    position: Position,
  ) -> Result<u64, ConnectionError> {
    self
      .connection
      .request(command, to_lsp_position(text, position))
  }

  /// Moves to the first candidate location.
  pub fn handle_go_to(&self, locations: &[LspLocation], jumper: &mut dyn CodeJumper) -> bool {
    let Some(location) = locations.first() else {
      return false;
    };
    let start = location.range.start;

    if same_document(&location.uri, self.document_uri()) {
      let Some(position) = jumper
        .active_editor()
        .map(|editor| from_lsp_position(editor.text(), start))
      else {
        debug!(uri = %location.uri, "goTo target editor is gone");
        return false;
      };
      let position = jumper.jump_position(position);
      return jumper.jump(&position);
    }

    let target = GlobalJumpTarget {
      uri:          strip_file_scheme(&location.uri).to_string(),
      editor_index: 0,
      line:         start.line as usize,
      column:       start.character as usize,
    };
    jumper.global_jump(&target, true)
  }

  /// Drains ready connection events into `jumper`. Returns how many
  /// events were handled.
  pub fn pump(&mut self, jumper: &mut dyn CodeJumper) -> usize {
    let mut handled = 0;
    while let Some(event) = self.connection.poll_event() {
      handled += 1;
      match event {
        LspEvent::GoTo { command, locations } => {
          let moved = self.handle_go_to(&locations, jumper);
          debug!(method = command.method(), moved, "applied goTo");
        },
        LspEvent::Initialized { .. } => {
          debug!(document = %self.document_uri(), "language server ready");
        },
        LspEvent::Closed => {
          debug!(document = %self.document_uri(), "language server connection closed");
        },
      }
    }
    handled
  }

  pub fn is_closed(&self) -> bool {
    self.connection.is_closed()
  }

  pub fn close(&mut self) {
    self.connection.close();
  }
}

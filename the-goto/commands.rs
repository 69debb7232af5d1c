//! Command surface exposed to the host: four lexical jump commands, their
//! default key bindings, and the semantic commands of file editors.

use the_lib::{
  editor::ScreenCoords,
  jump::Jump,
  jumper::CodeJumper,
};
use the_lsp::LspCommand;
use tracing::debug;

use crate::registry::{
  Navigator,
  WidgetId,
};

pub const NOTEBOOK_CATEGORY: &str = "Notebook Cell Operations";
pub const FILE_EDITOR_CATEGORY: &str = "Text Editor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
  Notebook,
  FileEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpCommand {
  JumpNotebook,
  JumpBackNotebook,
  JumpFileEditor,
  JumpBackFileEditor,
}

impl JumpCommand {
  pub const ALL: [Self; 4] = [
    Self::JumpNotebook,
    Self::JumpBackNotebook,
    Self::JumpFileEditor,
    Self::JumpBackFileEditor,
  ];

  pub const fn id(self) -> &'static str {
    match self {
      Self::JumpNotebook => "go-to-definition:notebook",
      Self::JumpBackNotebook => "go-to-definition:notebook-back",
      Self::JumpFileEditor => "go-to-definition:file-editor",
      Self::JumpBackFileEditor => "go-to-definition:file-editor-back",
    }
  }

  pub const fn label(self) -> &'static str {
    if self.is_back() {
      "Jump back"
    } else {
      "Jump to definition"
    }
  }

  pub const fn surface(self) -> Surface {
    match self {
      Self::JumpNotebook | Self::JumpBackNotebook => Surface::Notebook,
      Self::JumpFileEditor | Self::JumpBackFileEditor => Surface::FileEditor,
    }
  }

  pub const fn category(self) -> &'static str {
    match self.surface() {
      Surface::Notebook => NOTEBOOK_CATEGORY,
      Surface::FileEditor => FILE_EDITOR_CATEGORY,
    }
  }

  pub const fn is_back(self) -> bool {
    matches!(self, Self::JumpBackNotebook | Self::JumpBackFileEditor)
  }

  pub fn from_id(id: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|command| command.id() == id)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
  /// Host selector the binding is scoped to.
  pub selector: &'static str,
  pub keys:     &'static str,
  pub command:  JumpCommand,
}

pub const DEFAULT_KEYBINDINGS: [KeyBinding; 4] = [
  KeyBinding {
    selector: ".jp-Notebook.jp-mod-editMode",
    keys:     "Ctrl Alt B",
    command:  JumpCommand::JumpNotebook,
  },
  KeyBinding {
    selector: ".jp-Notebook",
    keys:     "Alt O",
    command:  JumpCommand::JumpBackNotebook,
  },
  KeyBinding {
    selector: ".jp-FileEditor",
    keys:     "Ctrl Alt B",
    command:  JumpCommand::JumpFileEditor,
  },
  KeyBinding {
    selector: ".jp-FileEditor",
    keys:     "Alt O",
    command:  JumpCommand::JumpBackFileEditor,
  },
];

impl Navigator {
  fn tracker_current(&self, surface: Surface) -> Option<WidgetId> {
    match surface {
      Surface::Notebook => self.current_notebook.clone().map(WidgetId::Notebook),
      Surface::FileEditor => self.current_file.clone().map(WidgetId::File),
    }
  }

  /// A jump command is enabled while its tracker's current widget is the
  /// widget the shell has focused.
  pub fn is_command_enabled(&self, command: JumpCommand, shell_current: Option<&WidgetId>) -> bool {
    match (self.tracker_current(command.surface()), shell_current) {
      (Some(current), Some(shell)) => current == *shell,
      _ => false,
    }
  }

  /// Runs `command` on its tracker's current widget, using the token under
  /// the caret of the active editor.
  pub fn execute(&mut self, command: JumpCommand) -> bool {
    let Some(widget) = self.tracker_current(command.surface()) else {
      return false;
    };
    let Some(jumper) = self.jumper_mut(&widget) else {
      return false;
    };

    if command.is_back() {
      return jumper.jump_back();
    }
    let Some(jump) = caret_jump(jumper) else {
      return false;
    };
    debug!(command = command.id(), name = %jump.token.value, "jump to definition");
    jumper.jump_to_definition(&jump)
  }

  /// Whether the current file editor's connection supports `command`.
  pub fn is_lsp_command_enabled(&self, command: LspCommand) -> bool {
    self
      .current_file
      .as_deref()
      .and_then(|id| self.bridge(id))
      .is_some_and(|bridge| bridge.is_supported(command))
  }

  /// Semantic commands show only when `coords` point at a non-empty token
  /// in the current file editor.
  pub fn is_lsp_command_visible(&self, coords: ScreenCoords) -> bool {
    let Some(editor) = self
      .current_file
      .as_deref()
      .and_then(|id| self.file_jumper(id))
      .map(|jumper| jumper.editor())
    else {
      return false;
    };
    editor
      .position_at_coords(coords)
      .is_some_and(|position| !editor.token_at(position).is_empty())
  }

  /// Sends `command` for the document position under `coords`. The result
  /// is applied by a later [`Navigator::pump`].
  pub fn execute_lsp_command(&mut self, command: LspCommand, coords: ScreenCoords) -> bool {
    let Some(entry) = self
      .current_file
      .clone()
      .and_then(|id| self.files.get_mut(&id))
    else {
      return false;
    };
    let Some(bridge) = entry.bridge.as_mut() else {
      return false;
    };
    let editor = entry.jumper.editor();
    let Some(position) = editor.position_at_coords(coords) else {
      return false;
    };

    match bridge.request(command, editor.text(), position) {
      Ok(id) => {
        debug!(command = command.id(), id, "sent semantic request");
        true
      },
      Err(err) => {
        debug!(command = command.id(), error = %err, "semantic request not sent");
        false
      },
    }
  }
}

fn caret_jump(jumper: &dyn CodeJumper) -> Option<Jump> {
  let editor = jumper.active_editor()?;
  let token = editor.token_at(editor.cursor());
  if token.is_empty() {
    return None;
  }
  let cell = jumper
    .editors()
    .iter()
    .position(|candidate| candidate.id() == editor.id())?;
  Some(Jump::new(token).in_cell(cell))
}

use crate::capabilities::LspCapability;

/// Semantic requests a file editor can issue through its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LspCommand {
  Definition,
  TypeDefinition,
  References,
}

impl LspCommand {
  pub const ALL: [Self; 3] = [Self::Definition, Self::TypeDefinition, Self::References];

  pub const fn id(self) -> &'static str {
    match self {
      Self::Definition => "lsp_get_definition",
      Self::TypeDefinition => "lsp_get_type_definition",
      Self::References => "lsp_get_references",
    }
  }

  pub const fn label(self) -> &'static str {
    match self {
      Self::Definition => "Jump to definition",
      Self::TypeDefinition => "Highlight type definition",
      Self::References => "Highlight references",
    }
  }

  pub const fn method(self) -> &'static str {
    match self {
      Self::Definition => "textDocument/definition",
      Self::TypeDefinition => "textDocument/typeDefinition",
      Self::References => "textDocument/references",
    }
  }

  pub const fn capability(self) -> LspCapability {
    match self {
      Self::Definition => LspCapability::GotoDefinition,
      Self::TypeDefinition => LspCapability::GotoTypeDefinition,
      Self::References => LspCapability::GotoReference,
    }
  }

  pub fn from_id(id: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|command| command.id() == id)
  }
}

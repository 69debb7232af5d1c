use std::collections::HashSet;

use serde_json::Value;

/// Semantic navigation features a server may advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LspCapability {
  GotoDefinition,
  GotoTypeDefinition,
  GotoReference,
}

impl LspCapability {
  pub const ALL: [Self; 3] = [
    Self::GotoDefinition,
    Self::GotoTypeDefinition,
    Self::GotoReference,
  ];

  /// Key of this capability in the server's `ServerCapabilities` object.
  pub const fn provider_key(self) -> &'static str {
    match self {
      Self::GotoDefinition => "definitionProvider",
      Self::GotoTypeDefinition => "typeDefinitionProvider",
      Self::GotoReference => "referencesProvider",
    }
  }
}

/// Capabilities taken from an `initialize` result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerCapabilitiesSnapshot {
  raw:       Value,
  supported: HashSet<LspCapability>,
}

impl ServerCapabilitiesSnapshot {
  pub fn from_raw(raw: Value) -> Self {
    let supported = LspCapability::ALL
      .into_iter()
      .filter(|capability| capability_present(&raw, capability.provider_key()))
      .collect();
    Self { raw, supported }
  }

  /// Reads `capabilities` out of a full `initialize` result.
  pub fn from_initialize_result(result: Option<&Value>) -> Self {
    let raw = result
      .and_then(|result| result.get("capabilities"))
      .cloned()
      .unwrap_or(Value::Null);
    Self::from_raw(raw)
  }

  pub fn raw(&self) -> &Value {
    &self.raw
  }

  pub fn supports(&self, capability: LspCapability) -> bool {
    self.supported.contains(&capability)
  }

  pub fn is_definition_supported(&self) -> bool {
    self.supports(LspCapability::GotoDefinition)
  }

  pub fn is_type_definition_supported(&self) -> bool {
    self.supports(LspCapability::GotoTypeDefinition)
  }

  pub fn is_references_supported(&self) -> bool {
    self.supports(LspCapability::GotoReference)
  }
}

fn capability_present(raw: &Value, key: &str) -> bool {
  match raw.get(key) {
    Some(Value::Bool(enabled)) => *enabled,
    Some(Value::Null) | None => false,
    Some(_) => true,
  }
}

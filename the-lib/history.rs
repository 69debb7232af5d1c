//! Jump history: where to return to after a forward jump.
//!
//! Stacks are keyed by the identity of the editor the jump started from, so
//! "jump back" keeps working after the widget showing that editor has been
//! replaced. The store is owned by the navigation layer for the whole session
//! and shared between jumpers on the UI thread.

use std::{
  cell::RefCell,
  collections::HashMap,
  fmt,
  rc::Rc,
};

use crate::jump::JumpPosition;

/// Stable identity of a logical editor surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditorIdentity {
  File(String),
  Notebook(String),
}

impl fmt::Display for EditorIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File(id) => write!(f, "file:{id}"),
      Self::Notebook(id) => write!(f, "notebook:{id}"),
    }
  }
}

pub type SharedHistory = Rc<RefCell<JumpHistory>>;

#[derive(Debug, Default)]
pub struct JumpHistory {
  stacks: HashMap<EditorIdentity, Vec<JumpPosition>>,
}

impl JumpHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn shared() -> SharedHistory {
    Rc::new(RefCell::new(Self::new()))
  }

  pub fn store(&mut self, identity: &EditorIdentity, position: JumpPosition) {
    self
      .stacks
      .entry(identity.clone())
      .or_default()
      .push(position);
  }

  /// Pops the most recent position. Unknown identities behave like empty
  /// stacks.
  pub fn recollect(&mut self, identity: &EditorIdentity) -> Option<JumpPosition> {
    self.stacks.get_mut(identity)?.pop()
  }

  pub fn depth(&self, identity: &EditorIdentity) -> usize {
    self.stacks.get(identity).map_or(0, Vec::len)
  }

  /// Drops the stack of a closed editor.
  pub fn forget(&mut self, identity: &EditorIdentity) -> bool {
    self.stacks.remove(identity).is_some()
  }

  pub fn len(&self) -> usize {
    self.stacks.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

//! Process-scoped registry of live jumpers, bridges and hooks.
//!
//! The host reports widget lifecycle events here from its UI thread. Every
//! entry is created on an "added" event and removed again on the matching
//! close, together with the closed editor's jump history.

use std::{
  collections::HashMap,
  fmt,
  path::PathBuf,
  rc::Rc,
  sync::Arc,
  time::Instant,
};

use the_lib::{
  editor::CodeEditor,
  history::{
    JumpHistory,
    SharedHistory,
  },
  hook::{
    Gesture,
    HookRegistry,
  },
  host::DocumentHost,
  jumper::{
    CodeJumper,
    FileJumper,
    NotebookJumper,
  },
  rules::RuleRegistry,
};
use the_lsp::{
  ConnectionConfig,
  ConnectionError,
  LspConnection,
  PositionBridge,
};
use tracing::{
  debug,
  warn,
};

use crate::sweep::DeferredSweeps;

/// A document widget known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WidgetId {
  /// A file editor, by editor instance id.
  File(String),
  /// A notebook, by notebook id.
  Notebook(String),
}

impl fmt::Display for WidgetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File(id) => write!(f, "file editor {id}"),
      Self::Notebook(id) => write!(f, "notebook {id}"),
    }
  }
}

/// Opens the language server connection of a file editor.
pub trait ConnectionFactory {
  fn connect(
    &self,
    config: &ConnectionConfig,
    editor: &dyn CodeEditor,
  ) -> Result<Box<dyn LspConnection>, ConnectionError>;
}

impl<F> ConnectionFactory for F
where
  F: Fn(&ConnectionConfig, &dyn CodeEditor) -> Result<Box<dyn LspConnection>, ConnectionError>,
{
  fn connect(
    &self,
    config: &ConnectionConfig,
    editor: &dyn CodeEditor,
  ) -> Result<Box<dyn LspConnection>, ConnectionError> {
    self(config, editor)
  }
}

pub(crate) struct FileEntry {
  pub(crate) jumper: FileJumper,
  pub(crate) bridge: Option<PositionBridge>,
}

pub struct Navigator {
  host:                        Rc<dyn DocumentHost>,
  history:                     SharedHistory,
  rules:                       Arc<RuleRegistry>,
  connections:                 Option<Box<dyn ConnectionFactory>>,
  pub(crate) files:            HashMap<String, FileEntry>,
  pub(crate) notebooks:        HashMap<String, NotebookJumper>,
  hooks:                       HookRegistry,
  /// Hooked editor id to the widget owning it.
  owners:                      HashMap<String, WidgetId>,
  sweeps:                      DeferredSweeps,
  pub(crate) current_file:     Option<String>,
  pub(crate) current_notebook: Option<String>,
}

impl Navigator {
  pub fn new(host: Rc<dyn DocumentHost>) -> Self {
    Self {
      host,
      history: JumpHistory::shared(),
      rules: Arc::new(RuleRegistry::default()),
      connections: None,
      files: HashMap::new(),
      notebooks: HashMap::new(),
      hooks: HookRegistry::new(),
      owners: HashMap::new(),
      sweeps: DeferredSweeps::new(),
      current_file: None,
      current_notebook: None,
    }
  }

  pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
    self.rules = Arc::new(rules);
    self
  }

  pub fn with_connection_factory(mut self, factory: impl ConnectionFactory + 'static) -> Self {
    self.connections = Some(Box::new(factory));
    self
  }

  pub fn history(&self) -> SharedHistory {
    Rc::clone(&self.history)
  }

  pub fn hooks(&self) -> &HookRegistry {
    &self.hooks
  }

  pub fn sweeps(&self) -> &DeferredSweeps {
    &self.sweeps
  }

  /// A file editor widget was added: builds its jumper, hooks the editor
  /// and opens a connection when a factory is configured.
  pub fn file_editor_added(
    &mut self,
    editor: Box<dyn CodeEditor>,
    path: impl Into<PathBuf>,
  ) -> WidgetId {
    let id = editor.id().to_string();
    let jumper = FileJumper::new(editor, path, self.history(), Rc::clone(&self.host))
      .with_rules(Arc::clone(&self.rules));
    let bridge = self.open_bridge(&jumper);

    self.hook_editor(&id, WidgetId::File(id.clone()));
    self.files.insert(id.clone(), FileEntry { jumper, bridge });
    self.current_file = Some(id.clone());
    WidgetId::File(id)
  }

  fn open_bridge(&self, jumper: &FileJumper) -> Option<PositionBridge> {
    let factory = self.connections.as_ref()?;
    let config = ConnectionConfig::for_document(jumper.language(), jumper.cwd(), jumper.path());
    match factory.connect(&config, jumper.editor()) {
      Ok(connection) => {
        debug!(document = %config.document_uri(), "connected file editor");
        Some(PositionBridge::new(connection))
      },
      Err(err) => {
        warn!(
          document = %config.document_uri(),
          error = %err,
          "no language server connection; lexical navigation only"
        );
        None
      },
    }
  }

  /// A notebook widget was added. Its cells are hooked by a sweep once
  /// [`crate::sweep::NOTEBOOK_SWEEP_DELAY`] has passed after `now`.
  pub fn notebook_added(
    &mut self,
    id: impl Into<String>,
    path: impl Into<PathBuf>,
    language: impl Into<String>,
    now: Instant,
  ) -> WidgetId {
    let id = id.into();
    let jumper = NotebookJumper::new(
      id.clone(),
      path,
      language,
      self.history(),
      Rc::clone(&self.host),
    )
    .with_rules(Arc::clone(&self.rules));

    self.notebooks.insert(id.clone(), jumper);
    self.sweeps.schedule(&id, now);
    self.current_notebook = Some(id.clone());
    WidgetId::Notebook(id)
  }

  /// Inserts a cell editor. It is hooked once it becomes active or the
  /// notebook's sweep runs.
  pub fn notebook_cell_added(
    &mut self,
    notebook: &str,
    index: usize,
    cell: Box<dyn CodeEditor>,
  ) -> Option<usize> {
    let jumper = self.notebooks.get_mut(notebook)?;
    Some(jumper.insert_cell(index, cell))
  }

  pub fn notebook_cell_removed(&mut self, notebook: &str, index: usize) -> bool {
    let Some(cell) = self
      .notebooks
      .get_mut(notebook)
      .and_then(|jumper| jumper.remove_cell(index))
    else {
      return false;
    };
    self.unhook_editor(cell.id());
    true
  }

  /// The active cell of `notebook` changed; hooks that cell right away.
  pub fn active_cell_changed(&mut self, notebook: &str, index: usize) -> bool {
    let Some(jumper) = self.notebooks.get_mut(notebook) else {
      return false;
    };
    if !jumper.set_active_cell(index) {
      return false;
    }
    let Some(editor_id) = jumper.cell(index).map(|cell| cell.id().to_string()) else {
      return false;
    };
    self.hook_editor(&editor_id, WidgetId::Notebook(notebook.to_string()));
    true
  }

  /// Runs notebook sweeps that are due, hooking every cell of each swept
  /// notebook. Returns the number of newly hooked editors.
  pub fn tick(&mut self, now: Instant) -> usize {
    let mut hooked = 0;
    for notebook in self.sweeps.due(now) {
      let Some(jumper) = self.notebooks.get(&notebook) else {
        continue;
      };
      let editor_ids: Vec<String> = jumper
        .editors()
        .into_iter()
        .map(|editor| editor.id().to_string())
        .collect();
      for editor_id in editor_ids {
        if self.hook_editor(&editor_id, WidgetId::Notebook(notebook.clone())) {
          hooked += 1;
        }
      }
      debug!(notebook = %notebook, "swept notebook cells");
    }
    hooked
  }

  fn hook_editor(&mut self, editor_id: &str, owner: WidgetId) -> bool {
    self.owners.insert(editor_id.to_string(), owner);
    self.hooks.register(editor_id)
  }

  fn unhook_editor(&mut self, editor_id: &str) {
    self.hooks.unregister(editor_id);
    self.owners.remove(editor_id);
  }

  /// The content type of a file editor changed.
  pub fn mime_type_changed(&mut self, editor_id: &str, mime_type: &str) -> bool {
    let Some(entry) = self.files.get_mut(editor_id) else {
      return false;
    };
    entry.jumper.mime_type_changed(mime_type);
    true
  }

  /// Records `widget` as the current widget of its tracker.
  pub fn focus_changed(&mut self, widget: &WidgetId) {
    match widget {
      WidgetId::File(id) if self.files.contains_key(id) => self.current_file = Some(id.clone()),
      WidgetId::Notebook(id) if self.notebooks.contains_key(id) => {
        self.current_notebook = Some(id.clone())
      },
      _ => debug!(widget = %widget, "focus on unknown widget"),
    }
  }

  /// Removes everything held for `widget`: jumper, bridge, hooks, pending
  /// sweep and its jump history.
  pub fn editor_closed(&mut self, widget: &WidgetId) -> bool {
    let identity = match widget {
      WidgetId::File(id) => {
        let Some(mut entry) = self.files.remove(id) else {
          return false;
        };
        if let Some(bridge) = entry.bridge.as_mut() {
          bridge.close();
        }
        if self.current_file.as_deref() == Some(id) {
          self.current_file = None;
        }
        entry.jumper.identity()
      },
      WidgetId::Notebook(id) => {
        let Some(jumper) = self.notebooks.remove(id) else {
          return false;
        };
        self.sweeps.cancel(id);
        if self.current_notebook.as_deref() == Some(id) {
          self.current_notebook = None;
        }
        jumper.identity()
      },
    };

    let hooked: Vec<String> = self
      .owners
      .iter()
      .filter(|(_, owner)| *owner == widget)
      .map(|(editor_id, _)| editor_id.clone())
      .collect();
    for editor_id in hooked {
      self.unhook_editor(&editor_id);
    }

    self.history.borrow_mut().forget(&identity);
    debug!(widget = %widget, "closed");
    true
  }

  /// Routes a gesture on a hooked editor to its jumper. Gestures on editors
  /// that are no longer open are dropped.
  pub fn gesture(&mut self, editor_id: &str, gesture: &Gesture) -> bool {
    let Some(owner) = self.owners.get(editor_id) else {
      return false;
    };
    let jumper: &mut dyn CodeJumper = match owner {
      WidgetId::File(id) => {
        match self.files.get_mut(id) {
          Some(entry) => &mut entry.jumper,
          None => return false,
        }
      },
      WidgetId::Notebook(id) => {
        match self.notebooks.get_mut(id) {
          Some(jumper) => jumper,
          None => return false,
        }
      },
    };
    self.hooks.dispatch(editor_id, gesture, jumper)
  }

  /// Applies ready language server events of every open file editor.
  pub fn pump(&mut self) -> usize {
    self
      .files
      .values_mut()
      .filter_map(|entry| {
        let bridge = entry.bridge.as_mut()?;
        Some(bridge.pump(&mut entry.jumper))
      })
      .sum()
  }

  pub fn jumper(&self, widget: &WidgetId) -> Option<&dyn CodeJumper> {
    match widget {
      WidgetId::File(id) => {
        self
          .files
          .get(id)
          .map(|entry| &entry.jumper as &dyn CodeJumper)
      },
      WidgetId::Notebook(id) => self.notebooks.get(id).map(|jumper| jumper as &dyn CodeJumper),
    }
  }

  pub fn jumper_mut(&mut self, widget: &WidgetId) -> Option<&mut dyn CodeJumper> {
    match widget {
      WidgetId::File(id) => {
        self
          .files
          .get_mut(id)
          .map(|entry| &mut entry.jumper as &mut dyn CodeJumper)
      },
      WidgetId::Notebook(id) => {
        self
          .notebooks
          .get_mut(id)
          .map(|jumper| jumper as &mut dyn CodeJumper)
      },
    }
  }

  pub fn file_jumper(&self, editor_id: &str) -> Option<&FileJumper> {
    self.files.get(editor_id).map(|entry| &entry.jumper)
  }

  pub fn file_jumper_mut(&mut self, editor_id: &str) -> Option<&mut FileJumper> {
    self.files.get_mut(editor_id).map(|entry| &mut entry.jumper)
  }

  pub fn notebook_jumper(&self, notebook: &str) -> Option<&NotebookJumper> {
    self.notebooks.get(notebook)
  }

  pub fn notebook_jumper_mut(&mut self, notebook: &str) -> Option<&mut NotebookJumper> {
    self.notebooks.get_mut(notebook)
  }

  pub fn bridge(&self, editor_id: &str) -> Option<&PositionBridge> {
    self.files.get(editor_id)?.bridge.as_ref()
  }

  pub fn is_open(&self, widget: &WidgetId) -> bool {
    match widget {
      WidgetId::File(id) => self.files.contains_key(id),
      WidgetId::Notebook(id) => self.notebooks.contains_key(id),
    }
  }
}

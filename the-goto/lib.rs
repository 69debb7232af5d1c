//! Jump-to-definition navigation for editor hosts.
//!
//! A host forwards widget lifecycle events, gestures and language server
//! traffic to a [`Navigator`], which owns one jumper per open document.

pub mod commands;
pub mod registry;
pub mod settings;
pub mod sweep;

pub use registry::{
  ConnectionFactory,
  Navigator,
  WidgetId,
};
pub use settings::Settings;

pub mod editor;
pub mod history;
pub mod hook;
pub mod host;
pub mod jump;
pub mod jumper;
pub mod language;
pub mod locator;
pub mod position;
pub mod rules;
pub mod token;

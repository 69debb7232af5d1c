//! Text primitives shared by the navigation crates.

pub mod chars;
pub mod uri;

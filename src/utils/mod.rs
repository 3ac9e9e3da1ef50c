//! Helpers shared by the providers.

pub mod issue;
pub mod text;

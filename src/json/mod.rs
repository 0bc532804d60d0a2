//! JSON catalog helpers

pub mod diagnostics;

pub use diagnostics::JsonSyntaxError;

//! Heuristic value extraction from quote-page markup.
//!
//! Upstream layouts drift, so each field is located by an ordered chain of
//! interchangeable rules rather than a single hard-wired selector.

pub mod document;
pub mod rules;

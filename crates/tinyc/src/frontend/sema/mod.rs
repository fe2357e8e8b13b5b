//! Semantic analysis module

mod analyzer;
mod scope;

pub use analyzer::SemanticAnalyzer;
pub use scope::{Scope, Symbol, ValueType};

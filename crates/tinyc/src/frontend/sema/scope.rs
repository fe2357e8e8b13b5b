//! Symbol table and scope management

use std::collections::HashMap;
use std::fmt;

use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::common::SourceLocation;

/// Static type of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Bool,
    Str,
    /// Type of an expression that already produced an error. Never reported
    /// again, so one mistake does not cascade.
    Unknown,
}

impl ValueType {
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Unknown => "{unknown}",
        };
        f.write_str(s)
    }
}

/// A declared variable
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub ty: ValueType,
    pub declared_at: SourceLocation,
}

/// Nested lexical scopes, innermost last
pub struct Scope {
    names: DefaultStringInterner,
    frames: Vec<HashMap<DefaultSymbol, Symbol>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            names: DefaultStringInterner::default(),
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declare `name` in the innermost scope.
    ///
    /// Returns the earlier symbol if the name is already declared there.
    pub fn define(&mut self, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        let key = self.names.get_or_intern(name);
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        if let Some(existing) = frame.get(&key) {
            return Err(*existing);
        }
        frame.insert(key, symbol);
        Ok(())
    }

    /// Find `name` in the innermost scope that declares it
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let key = self.names.get(name)?;
        self.frames.iter().rev().find_map(|frame| frame.get(&key))
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(ty: ValueType, line: u32) -> Symbol {
        Symbol {
            ty,
            declared_at: SourceLocation::point(line, 5),
        }
    }

    #[test]
    fn test_define_and_lookup() {
        let mut scope = Scope::new();
        scope.define("x", symbol(ValueType::Int, 1)).unwrap();
        assert_eq!(scope.lookup("x").unwrap().ty, ValueType::Int);
        assert!(scope.lookup("y").is_none());
    }

    #[test]
    fn test_redefinition_returns_previous() {
        let mut scope = Scope::new();
        scope.define("x", symbol(ValueType::Int, 1)).unwrap();
        let previous = scope.define("x", symbol(ValueType::Str, 4)).unwrap_err();
        assert_eq!(previous.declared_at, SourceLocation::point(1, 5));
        assert_eq!(scope.lookup("x").unwrap().ty, ValueType::Int);
    }

    #[test]
    fn test_inner_scope_shadows_and_ends() {
        let mut scope = Scope::new();
        scope.define("x", symbol(ValueType::Int, 1)).unwrap();
        scope.push();
        scope.define("x", symbol(ValueType::Bool, 2)).unwrap();
        scope.define("y", symbol(ValueType::Str, 3)).unwrap();
        assert_eq!(scope.lookup("x").unwrap().ty, ValueType::Bool);
        scope.pop();
        assert_eq!(scope.lookup("x").unwrap().ty, ValueType::Int);
        assert!(scope.lookup("y").is_none());
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut scope = Scope::new();
        scope.define("x", symbol(ValueType::Int, 1)).unwrap();
        scope.pop();
        assert!(scope.lookup("x").is_some());
    }
}

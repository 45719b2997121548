use std::collections::{hash_map::Entry, HashMap};

use tracing::trace;

use crate::{error::RuntimeError, syntax::token::Token, value::Value};

/// Index of a scope frame inside an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    enclosing: Option<ScopeId>,
    values: HashMap<String, Value>,
}

/// The scope chain. Frames live in one arena and are opened and closed in
/// block order, so the innermost frame is always the last one.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![Scope {
                enclosing: None,
                values: HashMap::new(),
            }],
            current: ScopeId(0),
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Number of frames on the chain, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            enclosing: Some(self.current),
            values: HashMap::new(),
        });
        self.current = id;
        trace!(depth = self.depth(), "entered scope");
        id
    }

    /// Drops the innermost frame. The global frame is never removed.
    pub fn pop_scope(&mut self) {
        let Some(enclosing) = self.scopes[self.current.0].enclosing else {
            return;
        };

        self.scopes.truncate(self.current.0);
        self.current = enclosing;
        trace!(depth = self.depth(), "left scope");
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.scopes[self.current.0]
            .values
            .insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let mut scope = Some(self.current);

        while let Some(ScopeId(index)) = scope {
            if let Some(value) = self.scopes[index].values.get(&name.lexeme) {
                return Ok(value.clone());
            }
            scope = self.scopes[index].enclosing;
        }

        Err(RuntimeError::UndefinedVariable { name: name.clone() })
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut scope = Some(self.current);

        while let Some(ScopeId(index)) = scope {
            if let Entry::Occupied(mut e) = self.scopes[index].values.entry(name.lexeme.clone()) {
                e.insert(value);
                return Ok(());
            }
            scope = self.scopes[index].enclosing;
        }

        Err(RuntimeError::UndefinedVariable { name: name.clone() })
    }
}

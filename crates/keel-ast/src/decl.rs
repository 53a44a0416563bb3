//! Declarations and the table the resolver keeps them in

use crate::{DeclError, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a declaration in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Package,
    Class,
    Trait,
    Object,
    Method,
    Value,
    TypeAlias,
}

/// A named declaration together with the source of the unit that owns it
#[derive(Debug, Clone)]
pub struct Declaration {
    pub id: DeclId,
    /// Fully qualified name (e.g. "pkg.Foo.bar")
    pub name: String,
    pub kind: DeclKind,
    pub source: SourceFile,
}

impl Declaration {
    /// Whether the owning unit lives only in memory
    pub fn is_from_virtual_source(&self) -> bool {
        self.source.is_virtual()
    }
}

/// All declarations known to a compilation run
#[derive(Debug, Default)]
pub struct DeclTable {
    decls: Vec<Declaration>,
    by_name: HashMap<String, DeclId>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new name, returning error if it is already taken
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        kind: DeclKind,
        source: SourceFile,
    ) -> Result<DeclId, DeclError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(DeclError::Duplicate { name });
        }

        let id = DeclId(self.decls.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.decls.push(Declaration {
            id,
            name,
            kind,
            source,
        });
        Ok(id)
    }

    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.decls.get(id.0 as usize)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Declaration> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    pub fn name_of(&self, id: DeclId) -> Option<&str> {
        self.get(id).map(|d| d.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

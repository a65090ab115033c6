use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::ast::{Coord, Decl, EnumType, Enumerator, StructType};

use super::SymbolError;

/// What a name refers to: the AST node that introduced it.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'ast> {
    Decl(&'ast Decl),
    Struct(&'ast StructType),
    Enum(&'ast EnumType),
    Enumerator(&'ast Enumerator),
}

/// One lexical scope: a name table plus a link to the enclosing scope.
/// Insertion is shallow, lookup walks the parent chain.
#[derive(Debug, Default)]
pub struct Scope<'ast> {
    symbols: RefCell<HashMap<String, Symbol<'ast>>>,
    parent: Option<Rc<Scope<'ast>>>,
}

impl<'ast> Scope<'ast> {
    pub fn new() -> Rc<Scope<'ast>> {
        Rc::new(Scope::default())
    }

    pub fn nested(parent: &Rc<Scope<'ast>>) -> Rc<Scope<'ast>> {
        Rc::new(Scope {
            symbols: RefCell::default(),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Insert into this scope. The redefinition error carries the
    /// coordinate of the colliding (second) node.
    pub fn insert(
        &self,
        name: &str,
        symbol: Symbol<'ast>,
        coord: &Coord,
    ) -> Result<(), SymbolError> {
        let mut symbols = self.symbols.borrow_mut();
        if symbols.contains_key(name) {
            return Err(SymbolError::redefinition(name, coord));
        }
        symbols.insert(name.to_owned(), symbol);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol<'ast>> {
        if let Some(symbol) = self.symbols.borrow().get(name) {
            return Some(*symbol);
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

/// Output of the resolution pass: the symbol table visible inside each
/// scope-opening node. Function scopes are keyed by function name, which
/// the pass has verified to be unique at the top level.
#[derive(Debug)]
pub struct ScopeMap<'ast> {
    pub globals: Rc<Scope<'ast>>,
    functions: HashMap<String, Rc<Scope<'ast>>>,
}

impl<'ast> ScopeMap<'ast> {
    pub(super) fn new(globals: Rc<Scope<'ast>>) -> ScopeMap<'ast> {
        ScopeMap {
            globals,
            functions: HashMap::new(),
        }
    }

    pub(super) fn record_function(&mut self, name: &str, scope: Rc<Scope<'ast>>) {
        self.functions.insert(name.to_owned(), scope);
    }

    /// The scope active inside the body of the named function.
    pub fn function_scope(&self, name: &str) -> Option<&Rc<Scope<'ast>>> {
        self.functions.get(name)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Coord, Decl, IdentifierType, TypeNode};

    use super::{Scope, Symbol};

    fn int_decl(name: &str) -> Decl {
        Decl {
            name: Some(name.to_owned()),
            storage: vec![],
            ty: TypeNode::Identifier(IdentifierType {
                name: "int".to_owned(),
            }),
            init: None,
            coord: Coord::new("test.c", 1, 1),
        }
    }

    #[test]
    fn lookup_walks_parents() {
        let decl = int_decl("x");
        let globals = Scope::new();
        globals
            .insert("x", Symbol::Decl(&decl), &decl.coord)
            .unwrap();

        let inner = Scope::nested(&globals);
        assert!(inner.contains("x"));
        assert!(!inner.contains("y"));
    }

    #[test]
    fn insertion_is_shallow() {
        let outer_decl = int_decl("x");
        let inner_decl = int_decl("x");

        let globals = Scope::new();
        globals
            .insert("x", Symbol::Decl(&outer_decl), &outer_decl.coord)
            .unwrap();

        // The same name in a nested scope is fine.
        let inner = Scope::nested(&globals);
        inner
            .insert("x", Symbol::Decl(&inner_decl), &inner_decl.coord)
            .unwrap();
    }

    #[test]
    fn redefinition_is_rejected() {
        let first = int_decl("x");
        let second = Decl {
            coord: Coord::new("test.c", 2, 5),
            ..int_decl("x")
        };

        let scope = Scope::new();
        scope
            .insert("x", Symbol::Decl(&first), &first.coord)
            .unwrap();

        let err = scope
            .insert("x", Symbol::Decl(&second), &second.coord)
            .unwrap_err();
        assert_eq!(err.to_string(), "test.c:2:5: redefinition of 'x'");
    }
}

//! Symbol resolution for the AST.
//!
//! A single depth-first walk that builds the nested symbol tables, records
//! the scope visible inside each function, and rejects uses of undeclared
//! identifiers as well as redefinitions. Lowering runs only on ASTs this
//! pass has accepted.
mod error;
mod table;

pub use self::error::*;
pub use self::table::*;

use std::rc::Rc;

use crate::ast::{
    BlockItem, Compound, Decl, Expression, ExternalDecl, ForInit, FuncDef, Param, Statement,
    TranslationUnit, TypeNode,
};

type SResult<T> = Result<T, SymbolError>;

/// Build the scope map for a translation unit.
pub fn resolve(unit: &TranslationUnit) -> Result<ScopeMap<'_>, SymbolError> {
    let globals = Scope::new();
    let mut map = ScopeMap::new(Rc::clone(&globals));

    for item in &unit.items {
        match item {
            ExternalDecl::Decl(decl) => declare(decl, &globals)?,
            ExternalDecl::FuncDef(def) => func_def(def, &globals, &mut map)?,
            ExternalDecl::Typedef(typedef) => {
                return Err(SymbolError::unsupported(
                    "typedef is not supported",
                    &typedef.coord,
                ));
            }
        }
    }

    Ok(map)
}

/// Introduce a declaration into `scope`. A nameless declaration must be a
/// struct or enum definition and is inserted under its tag; an enum
/// definition also inserts each enumerator into the current scope.
fn declare<'ast>(decl: &'ast Decl, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    let Some(name) = &decl.name else {
        return match &decl.ty {
            TypeNode::Struct(def) => scope.insert(&def.name, Symbol::Struct(def), &decl.coord),
            TypeNode::Enum(def) => {
                if let Some(values) = &def.values {
                    for value in values {
                        scope.insert(&value.name, Symbol::Enumerator(value), &value.coord)?;
                    }
                }
                scope.insert(&def.name, Symbol::Enum(def), &decl.coord)
            }
            _ => Err(SymbolError::unsupported(
                "declaration without a name",
                &decl.coord,
            )),
        };
    };

    scope.insert(name, Symbol::Decl(decl), &decl.coord)?;
    array_dims(&decl.ty, scope)?;
    if let Some(init) = &decl.init {
        expression(init, scope)?;
    }
    Ok(())
}

/// Resolve identifier uses inside array dimensions (e.g. an enumerator as
/// the length).
fn array_dims<'ast>(ty: &'ast TypeNode, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    match ty {
        TypeNode::TypeDecl(decl) => array_dims(&decl.ty, scope),
        TypeNode::Ptr(ptr) => array_dims(&ptr.ty, scope),
        TypeNode::Array(array) => {
            if let Some(dim) = &array.dim {
                expression(dim, scope)?;
            }
            array_dims(&array.ty, scope)
        }
        _ => Ok(()),
    }
}

fn func_def<'ast>(
    def: &'ast FuncDef,
    scope: &Rc<Scope<'ast>>,
    map: &mut ScopeMap<'ast>,
) -> SResult<()> {
    declare(&def.decl, scope)?;

    let Some(name) = &def.decl.name else {
        return Err(SymbolError::unsupported(
            "function definition without a name",
            &def.coord,
        ));
    };

    let fn_scope = Scope::nested(scope);
    map.record_function(name, Rc::clone(&fn_scope));

    if let TypeNode::Func(func) = &def.decl.ty {
        for param in &func.params {
            let Param::Named(decl) = param else { continue };
            // An unnamed parameter is the `void` marker of an empty list.
            if decl.name.is_some() {
                declare(decl, &fn_scope)?;
            }
        }
    }

    compound(&def.body, &fn_scope)
}

fn compound<'ast>(block: &'ast Compound, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    for item in &block.items {
        block_item(item, scope)?;
    }
    Ok(())
}

fn block_item<'ast>(item: &'ast BlockItem, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    match item {
        BlockItem::Decl(decl) => declare(decl, scope),
        BlockItem::Statement(stmt) => statement(stmt, scope),
    }
}

fn statement<'ast>(stmt: &'ast Statement, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    match stmt {
        Statement::Compound(block) => compound(block, scope),
        Statement::If(if_stmt) => {
            expression(&if_stmt.cond, scope)?;
            statement(&if_stmt.then_stmt, scope)?;
            if let Some(else_stmt) = &if_stmt.else_stmt {
                statement(else_stmt, scope)?;
            }
            Ok(())
        }
        Statement::While(while_stmt) => {
            expression(&while_stmt.cond, scope)?;
            statement(&while_stmt.body, scope)
        }
        Statement::For(for_stmt) => {
            match &for_stmt.init {
                Some(ForInit::Decls(decls)) => {
                    for decl in decls {
                        declare(decl, scope)?;
                    }
                }
                Some(ForInit::Expression(init)) => expression(init, scope)?,
                None => {}
            }
            if let Some(cond) = &for_stmt.cond {
                expression(cond, scope)?;
            }
            if let Some(next) = &for_stmt.next {
                expression(next, scope)?;
            }
            statement(&for_stmt.body, scope)
        }
        Statement::Switch(switch) => {
            expression(&switch.cond, scope)?;
            for case in &switch.cases {
                if let Some(expr) = &case.expr {
                    expression(expr, scope)?;
                }
                for item in &case.items {
                    block_item(item, scope)?;
                }
            }
            Ok(())
        }
        Statement::Return(ret) => {
            if let Some(expr) = &ret.expr {
                expression(expr, scope)?;
            }
            Ok(())
        }
        Statement::Expression(expr) => expression(expr, scope),
        Statement::Break(_) | Statement::Empty => Ok(()),
    }
}

fn expression<'ast>(expr: &'ast Expression, scope: &Rc<Scope<'ast>>) -> SResult<()> {
    match expr {
        Expression::Constant(_) => Ok(()),
        Expression::Ident(ident) => {
            if !scope.contains(&ident.name) {
                return Err(SymbolError::undeclared(&ident.name, &ident.coord));
            }
            Ok(())
        }
        Expression::Binary(binary) => {
            expression(&binary.lhs, scope)?;
            expression(&binary.rhs, scope)
        }
        Expression::Unary(unary) => expression(&unary.expr, scope),
        Expression::Cast(cast) => expression(&cast.expr, scope),
        Expression::Call(call) => {
            if !scope.contains(&call.name.name) {
                return Err(SymbolError::undeclared(&call.name.name, &call.name.coord));
            }
            for arg in &call.args {
                expression(arg, scope)?;
            }
            Ok(())
        }
        Expression::ArrayRef(array_ref) => {
            expression(&array_ref.base, scope)?;
            expression(&array_ref.subscript, scope)
        }
        // Only the base is resolved here; the field name is checked against
        // the struct's declared fields during lowering.
        Expression::StructRef(struct_ref) => expression(&struct_ref.base, scope),
        Expression::InitList(list) => {
            for expr in &list.exprs {
                expression(expr, scope)?;
            }
            Ok(())
        }
        Expression::Assignment(assignment) => {
            expression(&assignment.lvalue, scope)?;
            expression(&assignment.rvalue, scope)
        }
    }
}

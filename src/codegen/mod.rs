//! Lowering of resolved ASTs to LLVM IR.
//!
//! The pass walks the translation unit a second time, reading the scope
//! map the resolver produced, and emits one module: enum constants and
//! prototypes at the top level, then one function at a time.
mod error;
mod function;
mod types;

pub use self::error::*;

use std::collections::HashMap;

use crate::ast::{Decl, ExternalDecl, TranslationUnit, TypeNode};
use crate::ir;
use crate::symbol::ScopeMap;

use self::function::FunctionGenerator;
use self::types::lower_fn_type;

type CResult<T> = Result<T, CodegenError>;

/// Lower a translation unit into an LLVM module named `name`.
pub fn lower<'ast>(
    name: &str,
    unit: &'ast TranslationUnit,
    scopes: &ScopeMap<'ast>,
) -> Result<ir::Module, CodegenError> {
    let mut module = ir::Module::new(name);
    let mut constants = HashMap::new();

    for item in &unit.items {
        match item {
            ExternalDecl::Decl(decl) => {
                top_level_decl(decl, scopes, &mut module, &mut constants)?;
            }
            ExternalDecl::FuncDef(def) => {
                FunctionGenerator::lower(&mut module, scopes, &constants, def)?;
            }
            ExternalDecl::Typedef(typedef) => {
                return Err(CodegenError::unsupported(
                    "typedef is not supported",
                    &typedef.coord,
                ));
            }
        }
    }

    Ok(module)
}

fn top_level_decl<'ast>(
    decl: &'ast Decl,
    scopes: &ScopeMap<'ast>,
    module: &mut ir::Module,
    constants: &mut HashMap<String, i64>,
) -> CResult<()> {
    let Some(name) = &decl.name else {
        // A bare enum definition binds each enumerator to its zero-based
        // position; a bare struct definition only introduces its tag.
        if let TypeNode::Enum(def) = &decl.ty {
            if let Some(values) = &def.values {
                for (position, value) in values.iter().enumerate() {
                    constants.insert(value.name.clone(), position as i64);
                }
            }
        }
        return Ok(());
    };

    match &decl.ty {
        TypeNode::Func(func) => {
            let ty = lower_fn_type(func, &scopes.globals, &decl.coord)?;
            module.declare_function(name, ty);
            Ok(())
        }
        _ => Err(CodegenError::unsupported(
            "global variables are not supported",
            &decl.coord,
        )),
    }
}

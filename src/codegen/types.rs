//! Lowering of AST type subtrees to LLVM types.
use crate::ast::{Constant, ConstantKind, Coord, Decl, Expression, FuncDecl, Param, StructType, TypeNode};
use crate::ir::{FuncType, Type};
use crate::symbol::{Scope, Symbol};

use super::{CResult, CodegenError};

/// Lower a type subtree against the visible scope. `coord` locates the
/// owning declaration for error reporting.
pub(super) fn lower_type<'ast>(
    node: &'ast TypeNode,
    scope: &Scope<'ast>,
    coord: &Coord,
) -> CResult<Type> {
    match node {
        TypeNode::TypeDecl(decl) => lower_type(&decl.ty, scope, coord),
        TypeNode::Func(func) => Ok(Type::Func(lower_fn_type(func, scope, coord)?)),
        TypeNode::Ptr(ptr) => {
            let pointee = lower_type(&ptr.ty, scope, coord)?;
            if matches!(pointee, Type::Func(_)) {
                return Err(CodegenError::unsupported(
                    "function pointers are not supported",
                    coord,
                ));
            }
            Ok(pointee.ptr())
        }
        TypeNode::Array(array) => {
            let elem = lower_type(&array.ty, scope, coord)?;
            match &array.dim {
                // An unsized array is a pointer (decay in parameter position).
                None => Ok(elem.ptr()),
                Some(dim) => Ok(Type::Array {
                    len: array_len(dim)?,
                    elem: Box::new(elem),
                }),
            }
        }
        TypeNode::Identifier(ident) => match ident.name.as_str() {
            "void" => Ok(Type::Void),
            "char" => Ok(Type::I8),
            "int" => Ok(Type::I32),
            other => Err(CodegenError::unsupported(
                format!("unsupported type '{other}'"),
                coord,
            )),
        },
        TypeNode::Enum(_) => Ok(Type::I32),
        TypeNode::Struct(def) => {
            let fields = struct_fields(def, scope, coord)?;
            let mut lowered = Vec::with_capacity(fields.len());
            for field in fields {
                lowered.push(lower_type(&field.ty, scope, &field.coord)?);
            }
            Ok(Type::Struct(lowered))
        }
    }
}

/// Lower a function type. A sole `void` parameter means an empty list; an
/// ellipsis sets the variadic flag and contributes no type.
pub(super) fn lower_fn_type<'ast>(
    func: &'ast FuncDecl,
    scope: &Scope<'ast>,
    coord: &Coord,
) -> CResult<FuncType> {
    let ret = lower_type(&func.ret, scope, coord)?;
    let mut params = vec![];
    let mut vararg = false;
    for param in &func.params {
        match param {
            Param::Ellipsis => vararg = true,
            Param::Named(decl) => params.push(lower_type(&decl.ty, scope, &decl.coord)?),
        }
    }
    if params.len() == 1 && params[0].is_void() {
        params.clear();
    }
    Ok(FuncType {
        ret: Box::new(ret),
        params,
        vararg,
    })
}

/// The declared field list of a struct type: its own when the node is a
/// definition, otherwise the one found under its tag in the scope.
pub(super) fn struct_fields<'ast>(
    def: &'ast StructType,
    scope: &Scope<'ast>,
    coord: &Coord,
) -> CResult<&'ast [Decl]> {
    if let Some(fields) = &def.fields {
        return Ok(fields);
    }
    match scope.lookup(&def.name) {
        Some(Symbol::Struct(found)) => match &found.fields {
            Some(fields) => Ok(fields),
            None => Err(CodegenError::unsupported(
                format!("incomplete struct '{}'", def.name),
                coord,
            )),
        },
        _ => Err(CodegenError::unsupported(
            format!("undeclared struct '{}'", def.name),
            coord,
        )),
    }
}

/// Parse an integer literal, detecting the base from the prefix: `0x`/`0X`
/// is hexadecimal, a leading `0` octal, anything else decimal.
pub(super) fn parse_int(value: &str, coord: &Coord) -> CResult<i64> {
    let (digits, radix) = if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        (hex, 16)
    } else if value.len() > 1 && value.starts_with('0') {
        (&value[1..], 8)
    } else {
        (value, 10)
    };
    i64::from_str_radix(digits, radix).map_err(|_| {
        CodegenError::unsupported(format!("invalid integer literal '{value}'"), coord)
    })
}

fn array_len(dim: &Expression) -> CResult<usize> {
    let Expression::Constant(Constant {
        kind: ConstantKind::Int,
        value,
        coord,
    }) = dim
    else {
        return Err(CodegenError::unsupported(
            "array dimension must be an integer constant",
            dim.coord(),
        ));
    };
    let len = parse_int(value, coord)?;
    usize::try_from(len).map_err(|_| {
        CodegenError::unsupported(format!("invalid array dimension '{value}'"), coord)
    })
}

#[cfg(test)]
mod tests {
    use crate::ast::Coord;

    use super::parse_int;

    #[test]
    fn base_follows_the_prefix() {
        let coord = Coord::new("test.c", 1, 1);
        assert_eq!(parse_int("42", &coord).unwrap(), 42);
        assert_eq!(parse_int("0x10", &coord).unwrap(), 16);
        assert_eq!(parse_int("0X10", &coord).unwrap(), 16);
        assert_eq!(parse_int("017", &coord).unwrap(), 15);
        assert_eq!(parse_int("0", &coord).unwrap(), 0);
    }

    #[test]
    fn bad_literals_are_rejected() {
        let coord = Coord::new("test.c", 1, 1);
        assert!(parse_int("0x", &coord).is_err());
        assert!(parse_int("08", &coord).is_err());
    }
}

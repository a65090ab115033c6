use super::{Coord, Decl, Expression};

/// Type subtree of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    TypeDecl(TypeDecl),
    Ptr(PtrDecl),
    Array(ArrayDecl),
    Func(FuncDecl),
    Identifier(IdentifierType),
    Struct(StructType),
    Enum(EnumType),
}

impl TypeNode {
    /// Strip the transparent `TypeDecl` wrapper, if any.
    pub fn strip_typedecl(&self) -> &TypeNode {
        match self {
            TypeNode::TypeDecl(decl) => decl.ty.strip_typedecl(),
            other => other,
        }
    }
}

/// Named wrapper around the core type of a declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub declname: Option<String>,
    pub ty: Box<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PtrDecl {
    pub ty: Box<TypeNode>,
}

/// Array type; `dim` is `None` for an unsized array (`int a[]`), which
/// decays to a pointer in parameter position.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDecl {
    pub ty: Box<TypeNode>,
    pub dim: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub ret: Box<TypeNode>,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Named(Decl),
    Ellipsis,
}

/// A builtin type name: `void`, `char` or `int`. Other names reach the
/// lowering pass unchanged and are rejected there.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierType {
    pub name: String,
}

/// `struct tag { fields }` when `fields` is `Some`, `struct tag` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub name: String,
    pub fields: Option<Vec<Decl>>,
    pub coord: Coord,
}

/// `enum tag { values }` when `values` is `Some`, `enum tag` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub values: Option<Vec<Enumerator>>,
    pub coord: Coord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub name: String,
    pub coord: Coord,
}

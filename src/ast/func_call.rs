use super::{Coord, Expression, Ident};

/// A call of a named function.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    pub name: Ident,
    pub args: Vec<Expression>,
    pub coord: Coord,
}

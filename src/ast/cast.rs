use super::{Coord, Expression, TypeNode};

/// `(type) expr`. Only pointer-to-pointer casts survive lowering.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub to: TypeNode,
    pub expr: Box<Expression>,
    pub coord: Coord,
}

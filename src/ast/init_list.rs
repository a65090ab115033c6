use super::{Coord, Expression};

/// `{ a, b, c }` — only legal as the initializer of a local array.
#[derive(Debug, Clone, PartialEq)]
pub struct InitList {
    pub exprs: Vec<Expression>,
    pub coord: Coord,
}

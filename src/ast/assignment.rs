use super::{Coord, Expression};

/// `lvalue = rvalue`. An expression: it yields the stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub lvalue: Box<Expression>,
    pub rvalue: Box<Expression>,
    pub coord: Coord,
}

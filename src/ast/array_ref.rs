use super::{Coord, Expression};

/// `base[subscript]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRef {
    pub base: Box<Expression>,
    pub subscript: Box<Expression>,
    pub coord: Coord,
}

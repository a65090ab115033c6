use super::{Coord, Decl, Expression, Statement};

/// `for (init; cond; next) body` — every header slot optional.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub init: Option<ForInit>,
    pub cond: Option<Expression>,
    pub next: Option<Expression>,
    pub body: Box<Statement>,
    pub coord: Coord,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Decls(Vec<Decl>),
    Expression(Expression),
}

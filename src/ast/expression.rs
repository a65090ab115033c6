use super::{
    ArrayRef, Assignment, BinaryExpr, CastExpr, Constant, Coord, FuncCall, Ident, InitList,
    StructRef, UnaryExpr,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(Constant),
    Ident(Ident),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Cast(CastExpr),
    Call(FuncCall),
    ArrayRef(ArrayRef),
    StructRef(StructRef),
    InitList(InitList),
    Assignment(Assignment),
}

impl Expression {
    pub fn coord(&self) -> &Coord {
        match self {
            Expression::Constant(Constant { coord, .. })
            | Expression::Ident(Ident { coord, .. })
            | Expression::Binary(BinaryExpr { coord, .. })
            | Expression::Unary(UnaryExpr { coord, .. })
            | Expression::Cast(CastExpr { coord, .. })
            | Expression::Call(FuncCall { coord, .. })
            | Expression::ArrayRef(ArrayRef { coord, .. })
            | Expression::StructRef(StructRef { coord, .. })
            | Expression::InitList(InitList { coord, .. })
            | Expression::Assignment(Assignment { coord, .. }) => coord,
        }
    }
}

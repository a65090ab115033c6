use super::Coord;

/// Use of a name: a variable, parameter, function or enumerator.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub coord: Coord,
}

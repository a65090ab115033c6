use std::{error::Error, fmt::Display};

use crate::ast::Coord;

/// An error raised while building the scope map.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolError {
    pub message: String,
    pub coord: Coord,
}

impl SymbolError {
    pub fn undeclared(name: &str, coord: &Coord) -> SymbolError {
        SymbolError {
            message: format!("use of undeclared identifier '{name}'"),
            coord: coord.clone(),
        }
    }

    pub fn redefinition(name: &str, coord: &Coord) -> SymbolError {
        SymbolError {
            message: format!("redefinition of '{name}'"),
            coord: coord.clone(),
        }
    }

    pub fn unsupported(message: impl ToString, coord: &Coord) -> SymbolError {
        SymbolError {
            message: message.to_string(),
            coord: coord.clone(),
        }
    }
}

impl Display for SymbolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.coord, self.message)
    }
}

impl Error for SymbolError {}

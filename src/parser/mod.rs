//! Parser binding.
//!
//! Parsing itself is delegated to the `lang-c` crate; this module drives
//! it and converts its C11 AST into the contract AST the passes consume,
//! rejecting whatever the contract cannot express.
mod convert;

use std::{error::Error, fmt::Display, path::Path};

use lang_c::driver::{self, Config};

use crate::ast::{Coord, TranslationUnit};

/// A syntax error from lang-c, or a construct outside the AST contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub coord: Option<Coord>,
}

impl ParseError {
    fn unsupported(message: impl ToString, coord: Coord) -> ParseError {
        ParseError {
            message: message.to_string(),
            coord: Some(coord),
        }
    }

    fn from_driver(message: impl ToString) -> ParseError {
        ParseError {
            message: message.to_string(),
            coord: None,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.coord {
            Some(coord) => write!(f, "{}: {}", coord, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for ParseError {}

/// Parse a source file, running the C preprocessor first. The
/// preprocessor is also what strips comments; clang's is known to.
pub fn parse_file(path: &Path) -> Result<TranslationUnit, ParseError> {
    let config = Config::with_clang();
    let parse = driver::parse(&config, path).map_err(ParseError::from_driver)?;
    convert::unit(&parse, &path.to_string_lossy())
}

/// Parse already-preprocessed source text. Used by the tests, which must
/// run without a C toolchain installed.
pub fn parse_source(source: &str, name: &str) -> Result<TranslationUnit, ParseError> {
    let config = Config::with_clang();
    let parse = driver::parse_preprocessed(&config, source.to_owned())
        .map_err(ParseError::from_driver)?;
    convert::unit(&parse, name)
}

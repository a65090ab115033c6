//! Shared helpers for the integration tests: run the whole pipeline over
//! preprocessed source text.
use minic::{codegen, parser, symbol};

/// Compile source text to textual IR, panicking on any pipeline error.
pub fn lower(source: &str) -> String {
    match try_lower(source) {
        Ok(ir) => ir,
        Err(message) => panic!("compilation failed: {message}"),
    }
}

/// Compile source text that is expected to be rejected; returns the error
/// message of whichever pass refused it.
pub fn lower_err(source: &str) -> String {
    match try_lower(source) {
        Ok(ir) => panic!("expected a compile error, got:\n{ir}"),
        Err(message) => message,
    }
}

pub fn try_lower(source: &str) -> Result<String, String> {
    let unit = parser::parse_source(source, "test.c").map_err(|err| err.to_string())?;
    let scopes = symbol::resolve(&unit).map_err(|err| err.to_string())?;
    let module = codegen::lower("test.c", &unit, &scopes).map_err(|err| err.to_string())?;
    Ok(module.to_string())
}

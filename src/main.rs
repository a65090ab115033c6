use std::{fmt::Display, path::PathBuf, process::exit};

use clap::Parser as CParser;
use log::info;

use minic::{codegen, parser, symbol};

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// File to compile
    file: PathBuf,

    /// Write output to <FILE> (defaults to the input with extension .ll)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();
    let args = Cli::parse();

    info!("parsing '{}'...", args.file.to_string_lossy());
    let unit = match parser::parse_file(&args.file) {
        Ok(unit) => unit,
        Err(err) => fail(err),
    };

    info!("resolving symbols...");
    let scopes = match symbol::resolve(&unit) {
        Ok(scopes) => scopes,
        Err(err) => fail(err),
    };

    info!("generating code...");
    let name = args.file.to_string_lossy();
    let module = match codegen::lower(&name, &unit, &scopes) {
        Ok(module) => module,
        Err(err) => fail(err),
    };

    let output = args
        .output
        .unwrap_or_else(|| args.file.with_extension("ll"));
    if let Err(err) = std::fs::write(&output, module.to_string()) {
        fail(format!(
            "could not write '{}': {err}",
            output.to_string_lossy()
        ));
    }
}

fn fail(err: impl Display) -> ! {
    eprintln!("{err}");
    exit(1);
}

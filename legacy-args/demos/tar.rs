//! A tar like front end with usage and error printing.
//!
//! Try `cargo run --example tar -- cvf backup.tar src` or
//! `cargo run --example tar -- -xv --file=backup.tar`.
use legacy_args::{Entry, Error, OptionSpec, Parser};

const USAGE: &str = "tar {c|x|t}[vf] [ARCHIVE] [FILE]...";

fn options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::flag("create", "create"),
        OptionSpec::flag("extract", "xtract"),
        OptionSpec::flag("list", "tlist"),
        OptionSpec::flag("verbose", "verbose"),
        OptionSpec::required("file", "file"),
        OptionSpec::required("directory", "Cdirectory"),
        OptionSpec::optional("compress", "zcompress"),
    ]
}

fn execute() -> Result<(), Error> {
    let options = options();
    let mut parser = Parser::new(&options);
    parser.set_tar_enabled(true);

    let mut mode = None;
    let mut verbose = false;
    let mut archive = None;
    let mut files = Vec::new();

    for Entry { name, param } in parser.parse_env()? {
        match name.as_deref() {
            Some(name @ ("create" | "extract" | "list")) => mode = Some(name.to_string()),
            Some("verbose") => verbose = true,
            Some("file") => archive = param,
            Some(name) => println!("ignoring --{} {:?}", name, param),
            None => files.extend(param),
        }
    }

    match mode {
        None => println!("{}", USAGE),
        Some(mode) => {
            println!("mode: {}", mode);
            println!("archive: {}", archive.as_deref().unwrap_or("-"));
            if verbose {
                println!("files: {:?}", files);
            }
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = execute() {
        eprintln!("error: {}", err);
        if let Some(option) = err.option() {
            eprintln!("  option: {}", option);
        }
        if let Some(value) = err.raw_value() {
            eprintln!("  value: {:?}", value.to_string_lossy());
        }
        eprintln!("usage: {}", USAGE);
        std::process::exit(1);
    }
}

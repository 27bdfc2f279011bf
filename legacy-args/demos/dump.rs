//! Prints every entry parsed from the command line.
use legacy_args::{Error, OptionSpec, Parser};

fn main() -> Result<(), Error> {
    let options = [
        OptionSpec::flag("help", "help"),
        OptionSpec::optional("color", "color"),
        OptionSpec::required("output", "output"),
        OptionSpec::required("number", "number"),
    ];

    for entry in Parser::new(&options).parse_env()? {
        match (entry.name(), entry.param()) {
            (Some(name), Some(param)) => println!("{}={:?}", name, param),
            (Some(name), None) => println!("{}", name),
            (None, Some(arg)) => println!("arg {:?}", arg),
            (None, None) => {}
        }
    }

    Ok(())
}

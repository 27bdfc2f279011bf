//! This crate turns a raw command line into an ordered list of option and
//! value entries.  It understands three syntaxes that tend to coexist in
//! older tools and can be freely mixed on one command line:
//!
//! * tar style: the first argument is a bundle of single letter flags whose
//!   parameters are taken from the arguments that follow (eg: `tar cvf x.tar`).
//! * POSIX short options: `-abc` combines flags, `-ofile` attaches a value.
//! * GNU long options: `--output=file`, `--output file` and unambiguous (or
//!   ambiguous, see below) abbreviations such as `--out`.
//!
//! Anything else is a positional argument, and `--` ends option parsing.
//!
//! # Example
//!
//! ```
//! use legacy_args::{Entry, Error, OptionSpec, Parser};
//!
//! fn main() -> Result<(), Error> {
//!     let options = [
//!         OptionSpec::flag("create", "create"),
//!         OptionSpec::flag("verbose", "verbose"),
//!         OptionSpec::required("file", "file"),
//!     ];
//!     let mut parser = Parser::new(&options);
//!     parser.set_tar_enabled(true);
//!
//!     let entries = parser.parse(["cvf", "backup.tar", "--", "-notes"])?;
//!     assert_eq!(
//!         entries,
//!         vec![
//!             Entry::flag("create"),
//!             Entry::flag("verbose"),
//!             Entry::option("file", Some("backup.tar")),
//!             Entry::positional("-notes"),
//!         ]
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! # Behavior
//!
//! * Tar style is only considered when enabled with
//!   [`Parser::set_tar_enabled`] and the first argument does not start with
//!   `-`.  Every letter of that argument is an option; options taking a
//!   parameter consume the following arguments in order.
//! * Short and tar letters are resolved against the first character of each
//!   [`OptionSpec::alias`].  Long names are resolved as a prefix of the alias.
//!   In both cases the option declared first wins.  Ambiguous abbreviations
//!   are never reported.
//! * In a combined short option (`-vqr`) the first letter that takes a
//!   parameter ends the chain: the rest of the argument is its value.
//! * A required parameter that is not attached to its option (`-o out`,
//!   `--output out`) is taken from the next argument.  If that argument looks
//!   like an option, or there is none, parsing fails.
//! * Optional parameters of long options must be attached with `=`.
//! * `-` is always a positional argument.  After `--` every argument is
//!   positional, including further `--`.
//!
//! # Error Handling
//!
//! The first malformed argument aborts parsing with an [`Error`].  No partial
//! result is returned.  The error carries its [`ErrorKind`], the [`Style`] of
//! the offending option and its name, which is enough to render a diagnostic.
use std::ffi::{OsStr, OsString};
use std::fmt;

use tracing::{debug, trace};

pub struct Error {
    repr: Box<ErrorRepr>,
}

impl Error {
    fn new(kind: ErrorKind) -> Error {
        Error {
            repr: Box::new(ErrorRepr {
                kind,
                style: None,
                option: None,
                value: None,
            }),
        }
    }

    fn with_style(mut self, style: Style) -> Error {
        self.repr.style = Some(style);
        self
    }

    fn with_option<S: Into<String>>(mut self, option: S) -> Error {
        self.repr.option = Some(option.into());
        self
    }

    fn with_value(mut self, value: ErrorValue) -> Error {
        self.repr.value = Some(value);
        self
    }

    fn missing_parameter(spec: &OptionSpec, style: Style) -> Error {
        Error::new(ErrorKind::MissingParameter)
            .with_style(style)
            .with_option(spec.name())
    }

    pub fn kind(&self) -> ErrorKind {
        self.repr.kind
    }

    /// The syntax the offending option was written in.
    pub fn style(&self) -> Option<Style> {
        self.repr.style
    }

    /// The offending option.
    ///
    /// For unrecognized options this is the letter or abbreviation as it was
    /// written, for parameter errors it's the canonical option name.
    pub fn option(&self) -> Option<&str> {
        self.repr.option.as_deref()
    }

    pub fn raw_value(&self) -> Option<&OsStr> {
        match self.repr.value.as_ref()? {
            ErrorValue::String(s) => Some(OsStr::new(s)),
            ErrorValue::OsString(s) => Some(s),
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self.repr.value.as_ref()? {
            ErrorValue::String(s) => Some(s),
            ErrorValue::OsString(s) => s.to_str(),
        }
    }

    fn display_option(&self) -> String {
        match (self.style(), self.option()) {
            (Some(Style::Short), Some(x)) if self.kind() == ErrorKind::UnrecognizedOption => {
                format!("'-{}'", x)
            }
            (Some(Style::Long), Some(x)) if self.kind() == ErrorKind::UnrecognizedOption => {
                format!("'--{}'", x)
            }
            (_, Some(x)) => format!("'{}'", x),
            (_, None) => "''".to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = match self.style() {
            Some(style) => format!("{} ", style),
            None => String::new(),
        };
        match self.kind() {
            ErrorKind::UnrecognizedOption => {
                write!(f, "unrecognized {}option {}", style, self.display_option())
            }
            ErrorKind::MissingParameter => {
                write!(f, "missing parameter for {}option {}", style, self.display_option())
            }
            ErrorKind::UnexpectedParameter => {
                write!(f, "{}option {} does not take a parameter", style, self.display_option())?;
                if f.alternate() {
                    if let Some(value) = self.value() {
                        write!(f, ": {:?}", value)?;
                    }
                }
                Ok(())
            }
            ErrorKind::EmptyOptionName => {
                write!(f, "empty option name in {}option", style)?;
                if f.alternate() {
                    if let Some(value) = self.value() {
                        write!(f, ": {:?}", format!("--{}", value))?;
                    }
                }
                Ok(())
            }
            ErrorKind::InvalidUnicode => {
                write!(f, "argument contains invalid unicode")?;
                if f.alternate() {
                    if let Some(value) = self.raw_value() {
                        write!(f, ": {:?}", value)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind())
            .field("style", &self.style())
            .field("option", &self.option())
            .field("raw_value", &self.raw_value())
            .finish()
    }
}

impl std::error::Error for Error {}

enum ErrorValue {
    String(String),
    OsString(OsString),
}

struct ErrorRepr {
    kind: ErrorKind,
    style: Option<Style>,
    option: Option<String>,
    value: Option<ErrorValue>,
}

/// Represents a parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No declared option matches the letter or long name.
    UnrecognizedOption,
    /// An option requires a parameter but none was supplied.
    ///
    /// This is also raised for long options with an optional parameter that
    /// are given without `=value`.
    MissingParameter,
    /// A long option that does not take a parameter was given `=value`.
    UnexpectedParameter,
    /// A long option was written as `--=value`.
    EmptyOptionName,
    /// An argument passed as [`OsString`] is not valid unicode.
    InvalidUnicode,
}

/// The syntax an option was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// A letter of the leading tar style bundle (`cvf`).
    Tar,
    /// A letter of a single dash argument (`-cvf`).
    Short,
    /// A double dash argument (`--file`).
    Long,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Style::Tar => "tar",
            Style::Short => "short",
            Style::Long => "long",
        })
    }
}

/// Describes an option the parser recognizes.
///
/// The `name` is what ends up in the parsed [`Entry`].  The `alias` is what
/// the user types: its first letter selects the option in short and tar
/// style, and long options match any prefix of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionSpec {
    name: String,
    alias: String,
    takes_param: bool,
    requires_param: bool,
}

impl OptionSpec {
    /// Creates a new option description.
    ///
    /// `requires_param` only has an effect if `takes_param` is set.
    ///
    /// # Panics
    ///
    /// Panics if `alias` is empty.
    pub fn new<N, A>(name: N, alias: A, takes_param: bool, requires_param: bool) -> OptionSpec
    where
        N: Into<String>,
        A: Into<String>,
    {
        let alias = alias.into();
        assert!(!alias.is_empty(), "option alias must not be empty");
        OptionSpec {
            name: name.into(),
            alias,
            takes_param,
            requires_param: takes_param && requires_param,
        }
    }

    /// An option that never takes a parameter.
    pub fn flag<N: Into<String>, A: Into<String>>(name: N, alias: A) -> OptionSpec {
        OptionSpec::new(name, alias, false, false)
    }

    /// An option that may carry a parameter.
    pub fn optional<N: Into<String>, A: Into<String>>(name: N, alias: A) -> OptionSpec {
        OptionSpec::new(name, alias, true, false)
    }

    /// An option that must carry a parameter.
    pub fn required<N: Into<String>, A: Into<String>>(name: N, alias: A) -> OptionSpec {
        OptionSpec::new(name, alias, true, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn takes_param(&self) -> bool {
        self.takes_param
    }

    pub fn requires_param(&self) -> bool {
        self.requires_param
    }

    /// The letter that selects this option in short and tar style.
    pub fn first_letter(&self) -> char {
        // the alias is checked to be non empty on construction
        self.alias.chars().next().unwrap_or_default()
    }
}

/// Finds the first declared option whose alias starts with `letter`.
pub fn find_by_first_letter(options: &[OptionSpec], letter: char) -> Option<&OptionSpec> {
    options.iter().find(|opt| opt.first_letter() == letter)
}

/// Finds the first declared option whose alias starts with `prefix`.
///
/// The prefix may be the full alias.  Other options matching the same prefix
/// are shadowed silently.
pub fn find_by_abbreviation<'o>(options: &'o [OptionSpec], prefix: &str) -> Option<&'o OptionSpec> {
    options.iter().find(|opt| opt.alias.starts_with(prefix))
}

/// A single parsed unit of the command line.
///
/// Options have a `name`, positional arguments do not.  The `param` holds
/// the value of an option if one was given, or the text of a positional
/// argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entry {
    pub name: Option<String>,
    pub param: Option<String>,
}

impl Entry {
    /// Creates an entry for a matched option.
    pub fn option<N, P>(name: N, param: Option<P>) -> Entry
    where
        N: Into<String>,
        P: Into<String>,
    {
        Entry {
            name: Some(name.into()),
            param: param.map(Into::into),
        }
    }

    /// Creates an entry for an option without a parameter.
    pub fn flag<N: Into<String>>(name: N) -> Entry {
        Entry {
            name: Some(name.into()),
            param: None,
        }
    }

    /// Creates an entry for a positional argument.
    pub fn positional<P: Into<String>>(value: P) -> Entry {
        Entry {
            name: None,
            param: Some(value.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    /// Is this a positional argument?
    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }

    /// Is this a specific option?
    pub fn is_option(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// A required parameter that has to come from the next argument.
#[derive(Clone, Copy)]
struct Pending<'o> {
    spec: &'o OptionSpec,
    style: Style,
}

/// Parses a command line against a list of options.
///
/// This is a shortcut for creating a [`Parser`], setting the tar mode and
/// calling [`Parser::parse`].
pub fn parse<I, S>(options: &[OptionSpec], tar_enabled: bool, args: I) -> Result<Vec<Entry>, Error>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parser = Parser::new(options);
    parser.set_tar_enabled(tar_enabled);
    parser.parse(args)
}

/// A command line parser for mixed tar, short and long style options.
///
/// The parser only borrows the option list and keeps no state between
/// calls, so one parser can be used for any number of command lines.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'o> {
    options: &'o [OptionSpec],
    tar_enabled: bool,
}

impl<'o> Parser<'o> {
    /// Creates a parser for the given options with tar style disabled.
    pub fn new(options: &'o [OptionSpec]) -> Parser<'o> {
        Parser {
            options,
            tar_enabled: false,
        }
    }

    /// Returns the declared options.
    pub fn options(&self) -> &'o [OptionSpec] {
        self.options
    }

    /// Is tar style enabled for the first argument?
    #[inline]
    pub fn tar_enabled(&self) -> bool {
        self.tar_enabled
    }

    /// Enables or disables tar style for the first argument.
    ///
    /// **Default:** disabled
    #[inline]
    pub fn set_tar_enabled(&mut self, yes: bool) {
        self.tar_enabled = yes;
    }

    /// Parses the arguments of the current process.
    ///
    /// The first argument (the program name) is skipped.
    pub fn parse_env(&self) -> Result<Vec<Entry>, Error> {
        self.parse_os(std::env::args_os().skip(1))
    }

    /// Parses arguments that might not be valid unicode.
    ///
    /// Fails with [`ErrorKind::InvalidUnicode`] before anything else is
    /// parsed if one of the arguments cannot be converted.
    pub fn parse_os<I, S>(&self, args: I) -> Result<Vec<Entry>, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args = args
            .into_iter()
            .map(|arg| os_string_into_string(arg.into()))
            .collect::<Result<Vec<_>, _>>()?;
        self.parse(args)
    }

    /// Parses a command line (without the program name) into entries.
    ///
    /// Entries are returned in the order they appear on the command line.
    pub fn parse<I, S>(&self, args: I) -> Result<Vec<Entry>, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut entries = Vec::new();
        let first = match args.first() {
            Some(first) => first,
            None => return Ok(entries),
        };
        debug!(args = args.len(), tar = self.tar_enabled, "parsing command line");

        let start = if self.tar_enabled && !first.starts_with('-') {
            let start = self.parse_tar(&args, &mut entries)?;
            debug!(consumed = start, "finished tar style options");
            start
        } else {
            0
        };

        let mut terminated = false;
        let mut pending: Option<Pending<'o>> = None;
        for arg in args.into_iter().skip(start) {
            if terminated || arg == "-" || !arg.starts_with('-') {
                entries.push(Entry {
                    name: pending.take().map(|p| p.spec.name().to_string()),
                    param: Some(arg),
                });
            } else if arg == "--" {
                // a pending option still gets the next argument
                terminated = true;
            } else if let Some(p) = pending {
                return Err(Error::missing_parameter(p.spec, p.style));
            } else if let Some(body) = arg.strip_prefix("--") {
                pending = self.parse_long(body, &mut entries)?;
            } else {
                pending = self.parse_short(&arg[1..], &mut entries)?;
            }
        }

        match pending {
            Some(p) => Err(Error::missing_parameter(p.spec, p.style)),
            None => Ok(entries),
        }
    }

    /// Parses the tar style bundle in the first argument.
    ///
    /// Returns the index of the first argument not consumed as a parameter.
    fn parse_tar(&self, args: &[String], entries: &mut Vec<Entry>) -> Result<usize, Error> {
        let mut next_param = 1;
        for letter in args[0].chars() {
            let spec = self.lookup_letter(letter, Style::Tar)?;
            let param = if !spec.takes_param() {
                None
            } else if let Some(param) = args.get(next_param) {
                next_param += 1;
                Some(param.clone())
            } else if spec.requires_param() {
                return Err(Error::missing_parameter(spec, Style::Tar));
            } else {
                None
            };
            entries.push(Entry::option(spec.name(), param));
        }
        Ok(next_param)
    }

    /// Parses the body of a `--name[=value]` argument.
    fn parse_long(
        &self,
        body: &str,
        entries: &mut Vec<Entry>,
    ) -> Result<Option<Pending<'o>>, Error> {
        let (abbr, value) = match body.split_once('=') {
            Some(("", _)) => {
                return Err(Error::new(ErrorKind::EmptyOptionName)
                    .with_style(Style::Long)
                    .with_value(ErrorValue::String(body.to_string())));
            }
            Some((abbr, value)) => (abbr, Some(value)),
            None => (body, None),
        };

        let spec = find_by_abbreviation(self.options, abbr).ok_or_else(|| {
            Error::new(ErrorKind::UnrecognizedOption)
                .with_style(Style::Long)
                .with_option(abbr)
        })?;

        match value {
            Some(value) if !spec.takes_param() => Err(Error::new(ErrorKind::UnexpectedParameter)
                .with_style(Style::Long)
                .with_option(spec.name())
                .with_value(ErrorValue::String(value.to_string()))),
            None if spec.requires_param() => {
                trace!(option = spec.name(), "deferring parameter to next argument");
                Ok(Some(Pending {
                    spec,
                    style: Style::Long,
                }))
            }
            None if spec.takes_param() => Err(Error::missing_parameter(spec, Style::Long)),
            value => {
                entries.push(Entry::option(spec.name(), value));
                Ok(None)
            }
        }
    }

    /// Parses the body of a `-abc` argument.
    ///
    /// The first letter taking a parameter ends the chain, anything after it
    /// is its value.
    fn parse_short(
        &self,
        body: &str,
        entries: &mut Vec<Entry>,
    ) -> Result<Option<Pending<'o>>, Error> {
        for (idx, letter) in body.char_indices() {
            let spec = self.lookup_letter(letter, Style::Short)?;
            if !spec.takes_param() {
                entries.push(Entry::flag(spec.name()));
                continue;
            }

            let rest = &body[idx + letter.len_utf8()..];
            if rest.is_empty() && spec.requires_param() {
                trace!(option = spec.name(), "deferring parameter to next argument");
                return Ok(Some(Pending {
                    spec,
                    style: Style::Short,
                }));
            }
            entries.push(Entry::option(
                spec.name(),
                Some(rest).filter(|rest| !rest.is_empty()),
            ));
            return Ok(None);
        }
        Ok(None)
    }

    fn lookup_letter(&self, letter: char, style: Style) -> Result<&'o OptionSpec, Error> {
        find_by_first_letter(self.options, letter).ok_or_else(|| {
            Error::new(ErrorKind::UnrecognizedOption)
                .with_style(style)
                .with_option(letter.to_string())
        })
    }
}

fn os_string_into_string(s: OsString) -> Result<String, Error> {
    s.into_string()
        .map_err(|s| Error::new(ErrorKind::InvalidUnicode).with_value(ErrorValue::OsString(s)))
}

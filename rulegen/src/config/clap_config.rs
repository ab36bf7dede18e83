use clap::{Arg, ArgMatches, Command};

use super::{
    LogFormat, LogLevel, DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT, DEFAULT_SCHEMA,
};

/// Low-level `clap` object which provides with `value_source` which
/// indicates whether an option was set by the user (cli/env) or by the
/// default value.
///
/// Options are global so they can be given before or after the subcommand.
pub(super) fn command() -> Command {
    Command::new("rulegen")
        .about("Generate Firestore security rules from @firestore schema directives")
        .version(env!("CARGO_PKG_VERSION"))
        .propagate_version(true)
        .subcommand(Command::new("generate").about("Write the rules file (default)"))
        .subcommand(
            Command::new("check").about("Fail if the rules file does not match the schema"),
        )
        .subcommand(
            Command::new("print-directive")
                .about("Print the @firestore directive definition to include in the schema"),
        )
        .arg(
            Arg::new("schema")
                .help("GraphQL schema, or a pre-parsed JSON schema when ending in .json")
                .short('s')
                .long("schema")
                .value_name("SCHEMA")
                .env("RULEGEN_SCHEMA")
                .value_parser(clap::value_parser!(String))
                .default_value(DEFAULT_SCHEMA)
                .global(true),
        )
        .arg(
            Arg::new("output")
                .help("Generated rules file")
                .short('o')
                .long("output")
                .value_name("OUTPUT")
                .env("RULEGEN_OUTPUT")
                .value_parser(clap::value_parser!(String))
                .default_value(DEFAULT_OUTPUT)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .help("TOML config file with hand written rules")
                .short('c')
                .long("config")
                .value_name("CONFIG")
                .env("RULEGEN_CONFIG")
                .value_parser(clap::value_parser!(String))
                .default_value(DEFAULT_CONFIG_FILE)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .help("Log level")
                .long("log-level")
                .value_name("LOG_LEVEL")
                .env("LOG_LEVEL")
                .value_parser(clap::builder::EnumValueParser::<LogLevel>::new())
                .default_value("INFO")
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .help("Log format")
                .long("log-format")
                .value_name("LOG_FORMAT")
                .env("LOG_FORMAT")
                .value_parser(clap::builder::EnumValueParser::<LogFormat>::new())
                .default_value("PRETTY")
                .global(true),
        )
}

pub(super) fn get_matches() -> ArgMatches {
    command().get_matches()
}

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};
use std::path::PathBuf;

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("relayctl")
        .about("Management console for a proxy relay service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the console API, example: https://console.tld/api")
                .default_value("http://localhost:8080/api")
                .env("RELAYCTL_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Directory holding the persisted session (default: <config dir>/relayctl)")
                .env("RELAYCTL_DATA_DIR")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("RELAYCTL_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and persist the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account name")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("RELAYCTL_PASSWORD")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account name")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("RELAYCTL_PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("invite-code")
                        .short('i')
                        .long("invite-code")
                        .help("Invitation code")
                        .default_value(""),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the persisted session"))
        .subcommand(Command::new("profile").about("Show the signed-in user profile"))
        .subcommand(Command::new("refresh").about("Exchange the access token for a fresh one"))
        .subcommand(Command::new("nodes").about("List relay nodes"))
        .subcommand(Command::new("rules").about("List forwarding rules"))
        .subcommand(Command::new("packages").about("List traffic packages"))
        .subcommand(Command::new("orders").about("List orders"))
        .subcommand(
            Command::new("admin")
                .about("Administrative listings")
                .subcommand_required(true)
                .subcommand(Command::new("users").about("List all users"))
                .subcommand(Command::new("orders").about("List all orders")),
        )
}

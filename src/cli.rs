use clap::{Arg, Command};
use std::path::PathBuf;

pub fn clap_app() -> Command {
  Command::new(env!("CARGO_PKG_NAME"))
    .version(env!("CARGO_PKG_VERSION"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .after_help(
      "Your config is stored in $HOME/.config/jukectl/config.yml and can set the \
server URL, the status poll interval, and the page size.",
    )
    .arg(
      Arg::new("server-url")
        .short('s')
        .long("server-url")
        .value_name("URL")
        .help("Base URL of the jukebox server (default http://localhost:5000)"),
    )
    .arg(
      Arg::new("poll-interval")
        .long("poll-interval")
        .value_name("MILLISECONDS")
        .value_parser(clap::value_parser!(u64))
        .help("Playback status poll interval in milliseconds (default 3000)"),
    )
    .arg(
      Arg::new("page-size")
        .long("page-size")
        .value_name("TRACKS")
        .value_parser(clap::value_parser!(usize))
        .help("Number of tracks per displayed page (default 10)"),
    )
    .arg(
      Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Specify configuration file path"),
    )
    .arg(
      Arg::new("log-file")
        .long("log-file")
        .value_name("PATH")
        .value_parser(clap::value_parser!(PathBuf))
        .help("Write the log to PATH instead of the default location"),
    )
    .arg(
      Arg::new("debug")
        .long("debug")
        .action(clap::ArgAction::SetTrue)
        .help("Log at debug level (includes every poll tick)"),
    )
}

use clap::{value_parser, Arg, Command};

use liquidplay::launcher::{self, LaunchOptions};


fn main() -> anyhow::Result<()> {
    let matches = Command::new("liquidplay")
        .about("Drops a few editor-shaped bodies into a rapier world and syncs their actors")
        .arg(Arg::new("settings").long("settings").value_name("FILE").help("JSON settings file"))
        .arg(Arg::new("bodies").long("bodies").value_name("FILE").help("Physics Body Editor document"))
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .default_value("600"),
        )
        .arg(
            Arg::new("write-settings")
                .long("write-settings")
                .value_name("FILE")
                .help("Write the default settings to FILE and exit"),
        )
        .get_matches();

    launcher::run(LaunchOptions {
        settings: matches.get_one::<String>("settings").cloned(),
        bodies: matches.get_one::<String>("bodies").cloned(),
        frames: matches.get_one::<u32>("frames").copied().unwrap_or(600),
        write_settings: matches.get_one::<String>("write-settings").cloned(),
    })
}

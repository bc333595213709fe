use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{arg, value_parser, ArgMatches, Command};
use log::debug;

use physviz::animation::{Animation, Figure};
use physviz::gyration::{Gyration, GyrationConfig};
use physviz::output::{self, OutputConfig};
use physviz::stats::{self, Lookup, StatsConfig};
use physviz::wave::{Scenario, WaveAnimator, WaveConfig};
use physviz::{app, Error, Result};

fn dpi_arg() -> clap::Arg {
    arg!(--dpi <DPI> "Resolution of written videos, the figure is 10x6 inches")
        .required(false)
        .value_parser(value_parser!(u32))
        .default_value("150")
}

fn output_arg() -> clap::Arg {
    arg!(-o --output <FILE> "Write a video instead of opening a window (.gif or any ffmpeg format)")
        .required(false)
        .value_parser(value_parser!(PathBuf))
}

fn cli() -> Command {
    Command::new("physviz")
        .about("Animated physics illustrations and a YouTube channel statistics reporter")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("waves")
                .about("Animate travelling waves")
                .arg(
                    arg!(-s --scenario <N> "1: single frequency, 2: v_ph = v_gr, 3: v_ph = 2 v_gr, 4: v_ph = -2 v_gr, 5: pulse")
                        .required(false)
                        .value_parser(value_parser!(u8))
                        .default_value("4"),
                )
                .arg(output_arg())
                .arg(
                    arg!(--save "Write the video to the scenario's default file name")
                        .conflicts_with("output"),
                )
                .arg(dpi_arg()),
        )
        .subcommand(
            Command::new("gyration")
                .about("Animate particles gyrating coherently around field lines")
                .arg(
                    arg!(--rows <N> "Particles per column")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--cols <N> "Particles per row")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("8"),
                )
                .arg(
                    arg!(--radius <R> "Gyration radius")
                        .required(false)
                        .value_parser(value_parser!(f64))
                        .default_value("3"),
                )
                .arg(
                    arg!(--rotations <N> "Full rotations before the animation repeats")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("4"),
                )
                .arg(
                    arg!(--steps <N> "Frames per rotation")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("180"),
                )
                .arg(output_arg())
                .arg(dpi_arg()),
        )
        .subcommand(
            Command::new("channel-stats")
                .about("Print subscriber, view and video counts of a YouTube channel")
                .arg(
                    arg!(--key <KEY> "YouTube Data API key")
                        .required(false)
                        .env("YOUTUBE_API_KEY")
                        .hide_env_values(true),
                )
                .arg(arg!(--"by-id" "Treat the input as a channel id instead of a user name"))
                .arg(arg!(--"show-comments" "Also print the comment count"))
                .arg(
                    arg!(--timeout <SECS> "Give up on the request after this many seconds")
                        .required(false)
                        .value_parser(value_parser!(u64))
                        .default_value("10"),
                ),
        )
}

fn output_config(matches: &ArgMatches, default_path: Option<PathBuf>) -> OutputConfig {
    // An empty file name means "show a window", same as no file name.
    let path = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .or(default_path)
        .filter(|path| !path.as_os_str().is_empty());
    let dpi = *matches.get_one::<u32>("dpi").expect("has default");
    OutputConfig {
        path,
        figure: Figure {
            dpi,
            ..Figure::default()
        },
    }
}

fn play<A: Animation>(mut animation: A, output: &OutputConfig) -> Result<()> {
    match &output.path {
        Some(path) => output::record(&mut animation, path, output.figure),
        None => app::run(animation),
    }
}

fn waves(matches: &ArgMatches) -> Result<()> {
    let scenario = Scenario::try_from(*matches.get_one::<u8>("scenario").expect("has default"))?;
    let default_path = matches
        .get_flag("save")
        .then(|| PathBuf::from(scenario.file_name()));
    let config = WaveConfig {
        scenario,
        output: output_config(matches, default_path),
    };
    debug!("{config:?}");
    play(WaveAnimator::new(config.scenario), &config.output)
}

fn gyration(matches: &ArgMatches) -> Result<()> {
    let count = |id: &str| *matches.get_one::<usize>(id).expect("has default");
    let config = GyrationConfig {
        radius: *matches.get_one::<f64>("radius").expect("has default"),
        cols: count("cols"),
        rows: count("rows"),
        rotations: count("rotations"),
        steps_per_rotation: count("steps"),
        output: output_config(matches, None),
    };
    debug!("{config:?}");
    play(Gyration::new(&config)?, &config.output)
}

fn channel_stats(matches: &ArgMatches) -> Result<()> {
    let config = StatsConfig {
        key: matches.get_one::<String>("key").cloned(),
        lookup: if matches.get_flag("by-id") {
            Lookup::ChannelId
        } else {
            Lookup::Username
        },
        show_comments: matches.get_flag("show-comments"),
        timeout: Duration::from_secs(*matches.get_one::<u64>("timeout").expect("has default")),
        ..Default::default()
    };
    debug!("{config:?}");
    stats::run(&config, &mut io::stdin().lock(), &mut io::stdout().lock())
}

fn dispatch(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("waves", sub_matches)) => waves(sub_matches),
        Some(("gyration", sub_matches)) => gyration(sub_matches),
        Some(("channel-stats", sub_matches)) => channel_stats(sub_matches),
        _ => unreachable!(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();

    if let Err(err) = dispatch(&matches) {
        debug!("{err:?}");
        eprintln!("error: {err}");
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &Error) -> i32 {
    err.kind().exit_code()
}

use std::fs;
use std::io::{self, BufReader, Write};
use std::process;

use log::error;

use cdcl_sat::solver::Config;
use cdcl_sat::{run_multi_instance, run_single_instance};

fn main() {
    let matches = clap::App::new("cdcl-sat")
        .version(clap::crate_version!())
        .about("A CDCL SAT solver over DIMACS CNF input")
        .arg(
            clap::Arg::with_name("verb")
                .long("verb")
                .takes_value(true)
                .possible_values(&["0", "1", "2"])
                .help("Verbosity level (0=silent, 1=some, 2=more)"),
        )
        .arg(
            clap::Arg::with_name("multi")
                .long("multi")
                .help("Read a leading instance count, then solve that many instances back to back (spec §6.3)"),
        )
        .arg(
            clap::Arg::with_name("var-decay")
                .long("var-decay")
                .takes_value(true)
                .help("VSIDS activity decay factor"),
        )
        .arg(
            clap::Arg::with_name("rnd-freq")
                .long("rnd-freq")
                .takes_value(true)
                .help("Frequency with which the decision heuristic picks a random variable"),
        )
        .arg(
            clap::Arg::with_name("rnd-seed")
                .long("rnd-seed")
                .takes_value(true)
                .help("Seed for the decision heuristic's tie-breaking RNG"),
        )
        .arg(
            clap::Arg::with_name("luby")
                .long("luby")
                .help("Use the Luby restart sequence instead of geometric growth"),
        )
        .arg(clap::Arg::with_name("rfirst").long("rfirst").takes_value(true).help("Initial restart interval"))
        .arg(clap::Arg::with_name("rinc").long("rinc").takes_value(true).help("Restart interval growth factor"))
        .arg(clap::Arg::with_name("input").help("DIMACS CNF file; reads stdin if omitted"))
        .get_matches();

    {
        let level = match matches.value_of("verb") {
            Some("0") => log::LevelFilter::Off,
            Some("2") => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        };
        env_logger::Builder::new().filter_level(level).init();
    }

    let config_for = make_config_factory(&matches);

    let exit_code = run(&matches, config_for);
    process::exit(exit_code);
}

fn make_config_factory(matches: &clap::ArgMatches) -> impl Fn() -> Config + '_ {
    move || {
        let mut config = Config::default();

        if let Some(x) = matches.value_of("var-decay").and_then(|s| s.parse().ok()) {
            if x > 0.0 && x < 1.0 {
                config.heuristic.var_decay = x;
            }
        }
        if let Some(x) = matches.value_of("rnd-freq").and_then(|s| s.parse().ok()) {
            if (0.0..=1.0).contains(&x) {
                config.heuristic.random_var_freq = x;
            }
        }
        if let Some(x) = matches.value_of("rnd-seed").and_then(|s| s.parse().ok()) {
            if x != 0.0 {
                config.heuristic.random_seed = x;
            }
        }
        if matches.is_present("luby") {
            config.restart.luby_restarts = true;
        }
        if let Some(x) = matches.value_of("rfirst").and_then(|s| s.parse().ok()) {
            config.restart.restart_first = x;
        }
        if let Some(x) = matches.value_of("rinc").and_then(|s| s.parse().ok()) {
            if x > 1.0 {
                config.restart.restart_inc = x;
            }
        }

        config
    }
}

/// Returns the process exit code (spec §6.4: 0 on clean termination
/// regardless of verdict, nonzero on malformed input).
fn run(matches: &clap::ArgMatches, config_for: impl Fn() -> Config) -> i32 {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match matches.value_of("input") {
        Some(path) => match fs::File::open(path) {
            Ok(file) => dispatch(matches, &mut BufReader::new(file), &mut out, config_for),
            Err(e) => {
                error!("failed to open {}: {}", path, e);
                return 1;
            }
        },
        None => dispatch(matches, &mut BufReader::new(io::stdin()), &mut out, config_for),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn dispatch(
    matches: &clap::ArgMatches,
    input: &mut impl io::BufRead,
    out: &mut impl Write,
    config_for: impl Fn() -> Config,
) -> Result<(), cdcl_sat::dimacs::DimacsError> {
    if matches.is_present("multi") {
        run_multi_instance(input, out, config_for)
    } else {
        run_single_instance(input, out, config_for())
    }
}

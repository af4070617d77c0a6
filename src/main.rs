use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use regatta_score::conformance::{self, ReferenceCommand, ReferenceDump};
use regatta_score::output;
use regatta_score::regatta::Regatta;
use regatta_score::scoring::Series;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print series standings (default if no subcommand)
    Standings {
        /// Only show this series
        #[arg(short, long)]
        series: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the scored results of one race
    Race {
        /// Series name
        series: String,
        /// Race number (1-based, as shown in standings)
        number: usize,
    },
    /// Write the engine's results for a series in reference dump format
    Dump {
        /// Series name
        series: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check every series against an external reference scorer
    Check {
        /// Working directory; one subdirectory per series is recreated on each run
        dir: PathBuf,

        /// Reference scorer program [default: perl]
        #[arg(long)]
        program: Option<String>,

        /// Argument passed to the program (repeatable)
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "regatta-score")]
#[command(about = "Sailing regatta series scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Regatta dataset (YAML)
    input: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    regatta_score::logging::init_cli_logger(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Standings {
        series: None,
        json: false,
    });
    let start_time = Instant::now();

    let regatta = match Regatta::load(&cli.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {}", e);
            for message in e.messages() {
                eprintln!("  - {}", message);
            }
            std::process::exit(EXIT_CONFIG);
        }
    };

    let use_colors = output::should_use_colors();

    let code = match command {
        Commands::Standings { series, json } => {
            let selected: Vec<&Series> = match series {
                Some(name) => vec![find_series(&regatta, &name)],
                None => regatta.series().iter().collect(),
            };
            if json {
                print_standings_json(&regatta, &selected)
            } else {
                let tables: Vec<String> = selected
                    .iter()
                    .map(|s| output::format_standings_table(&regatta, s, use_colors))
                    .collect();
                println!("{}", tables.join("\n\n"));
                EXIT_SUCCESS
            }
        }
        Commands::Race { series, number } => {
            let series = find_series(&regatta, &series);
            let Some(race) = series.race(number) else {
                eprintln!(
                    "Invalid race number {}. Must be between 1 and {}.",
                    number,
                    series.races().len()
                );
                std::process::exit(EXIT_CONFIG);
            };
            println!(
                "{}",
                output::format_race_table(&regatta, series, race, use_colors)
            );
            EXIT_SUCCESS
        }
        Commands::Dump { series, output: path } => {
            let series = find_series(&regatta, &series);
            dump_series(series, path.as_deref())
        }
        Commands::Check { dir, program, args } => {
            let defaults = ReferenceCommand::default();
            let command = ReferenceCommand {
                program: resolve_path_arg(program.unwrap_or(defaults.program)),
                args: args.into_iter().map(resolve_path_arg).collect(),
            };
            run_check(&regatta, &dir, &command, use_colors, cli.verbose).await
        }
    };

    if cli.verbose {
        eprintln!("Finished in {:?}", start_time.elapsed());
    }

    std::process::exit(code);
}

fn find_series<'a>(regatta: &'a Regatta, name: &str) -> &'a Series {
    match regatta.series_by_name(name) {
        Some(series) => series,
        None => {
            let known: Vec<&str> = regatta.series().iter().map(Series::name).collect();
            eprintln!("Unknown series '{}'. Known series: {}", name, known.join(", "));
            std::process::exit(EXIT_CONFIG);
        }
    }
}

fn print_standings_json(regatta: &Regatta, selected: &[&Series]) -> i32 {
    let value: Vec<serde_json::Value> = selected
        .iter()
        .map(|s| {
            serde_json::json!({
                "series": s.name(),
                "fleet": s.fleet(),
                "races": s.races().len(),
                "throwouts": s.throwout_count(),
                "standings": output::standing_rows(regatta, &s.standings()),
            })
        })
        .collect();

    match serde_json::to_string_pretty(&value) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize standings: {}", e);
            EXIT_FAILURE
        }
    }
}

fn dump_series(series: &Series, path: Option<&Path>) -> i32 {
    let yaml = match ReferenceDump::from_series(series).to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    match path {
        Some(path) => match conformance::write_atomic(path, &yaml) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("{:#}", e);
                EXIT_FAILURE
            }
        },
        None => {
            print!("{}", yaml);
            EXIT_SUCCESS
        }
    }
}

async fn run_check(
    regatta: &Regatta,
    dir: &Path,
    command: &ReferenceCommand,
    use_colors: bool,
    verbose: bool,
) -> i32 {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Failed to create {}: {}", dir.display(), e);
        return EXIT_CONFIG;
    }

    let checks = conformance::run_all(regatta, dir, command).await;
    let mut all_passed = true;
    for check in &checks {
        if !check.passed() {
            all_passed = false;
        }
        if verbose || !check.passed() {
            println!("{}", output::format_series_check(check, use_colors));
        }
    }

    if all_passed {
        println!("All Pass!");
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

/// The reference runs inside each series directory, so relative paths to
/// existing files are made absolute first.
fn resolve_path_arg(arg: String) -> String {
    let path = Path::new(&arg);
    if path.is_relative() && path.exists() {
        if let Ok(absolute) = std::fs::canonicalize(path) {
            return absolute.to_string_lossy().into_owned();
        }
    }
    arg
}

use anyhow::{bail, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process;

use rail_sim::map_file::load_network_map;
use rail_sim::simulation::{trace, SearchStrategy, SimConfig, Simulation, DEFAULT_SEARCH_BUDGET};

#[derive(Parser)]
#[command(name = "rail_sim")]
#[command(about = "Turn-based simulation of trains sharing a railway network")]
struct Cli {
    /// Network map file
    map: PathBuf,

    /// Station every train starts from
    start: String,

    /// Station every train travels to
    end: String,

    /// Number of trains (positive integer)
    #[arg(allow_hyphen_values = true)]
    trains: String,

    /// Path extensions the exhaustive route search may make per train and turn
    #[arg(long, value_name = "STEPS")]
    search_budget: Option<usize>,

    /// Consider only the K shortest routes instead of enumerating all of them
    #[arg(long, value_name = "K", conflicts_with = "search_budget")]
    k_shortest: Option<usize>,

    /// Allow routes through stations a train has already visited
    #[arg(long)]
    no_history: bool,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        let search = match (self.k_shortest, self.search_budget) {
            (Some(k), _) => SearchStrategy::KShortest { k },
            (None, budget) => SearchStrategy::Exhaustive {
                budget: budget.unwrap_or(DEFAULT_SEARCH_BUDGET),
            },
        };
        SimConfig {
            search,
            use_history: !self.no_history,
        }
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn parse_train_count(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => bail!("Number of trains is not a valid positive integer"),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let train_count = parse_train_count(&cli.trains)?;
    let network = load_network_map(&cli.map)?;

    let mut simulation =
        Simulation::new(&network, &cli.start, &cli.end, train_count, cli.sim_config())?;
    let report = simulation.run();

    print!("{}", trace::render_report(&network, &report));
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            ErrorKind::MissingRequiredArgument
            | ErrorKind::UnknownArgument
            | ErrorKind::TooManyValues
            | ErrorKind::WrongNumberOfValues => {
                fail("Incorrect number of command line arguments")
            }
            _ => {
                let rendered = err.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or("Invalid command line arguments")
                    .trim_start_matches("error: ");
                fail(message)
            }
        },
    };

    if let Err(err) = run(&cli) {
        fail(&format!("{err:#}"));
    }
}

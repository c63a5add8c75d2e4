use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nestegg::report::{Report, TraceTable};
use nestegg::{
    InvestmentType, SeriesRepository, Simulation, SimulationError, SimulationParameters, TrialId,
    summarize,
};

#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Monte Carlo odds of outliving a retirement portfolio, replayed over historical returns"
)]
struct Cli {
    #[arg(long, default_value = ".", help = "Directory holding the historical *_pct.txt files")]
    data_dir: PathBuf,
    #[arg(long, help = "JSON parameters file; flags below override its values")]
    config: Option<PathBuf>,
    #[arg(long, help = "bonds, stocks, sbc_blend or sb_blend")]
    investment_type: Option<InvestmentType>,
    #[arg(long, help = "Starting portfolio value")]
    start_value: Option<i64>,
    #[arg(long, help = "Annual pre-tax withdrawal in today's money")]
    withdrawal: Option<i64>,
    #[arg(long)]
    min_years: Option<u32>,
    #[arg(long, help = "Most likely number of retirement years")]
    mode_years: Option<u32>,
    #[arg(long)]
    max_years: Option<u32>,
    #[arg(long, help = "Number of simulated retirements")]
    trials: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_name = "TRIAL", help = "Also print the year-by-year path of one trial")]
    trace: Option<u64>,
    #[arg(long, help = "Print the summary as JSON instead of text")]
    json: bool,
}

impl Cli {
    fn parameters(&self) -> Result<SimulationParameters, SimulationError> {
        let mut params = match &self.config {
            Some(path) => SimulationParameters::from_json_file(path)?,
            None => SimulationParameters::canonical(),
        };
        if let Some(t) = self.investment_type {
            params.investment_type = t;
        }
        if let Some(v) = self.start_value {
            params.start_value = v;
        }
        if let Some(v) = self.withdrawal {
            params.annual_withdrawal = v;
        }
        if let Some(v) = self.min_years {
            params.min_years = v;
        }
        if let Some(v) = self.mode_years {
            params.mode_years = v;
        }
        if let Some(v) = self.max_years {
            params.max_years = v;
        }
        if let Some(v) = self.trials {
            params.trial_count = v;
        }
        if self.seed.is_some() {
            params.seed = self.seed;
        }
        Ok(params)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nestegg=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), SimulationError> {
    let params = cli.parameters()?;
    params.validate()?;

    let repository = SeriesRepository::load(&cli.data_dir)?;
    let returns = repository.returns(params.investment_type);
    info!(
        investment = %params.investment_type,
        years = returns.len(),
        inflation_years = repository.inflation().len(),
        "loaded historical series"
    );

    let sim = Simulation::new(params, returns, repository.inflation())?;
    let outcomes = sim.run();
    let summary = summarize(&outcomes)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", Report::new(sim.params(), &summary));
        println!("Seed: {}", sim.seed());
    }

    if let Some(k) = cli.trace {
        let (trial, steps) = sim.trace_trial(TrialId(k));
        println!(
            "\nTrial {k}: start index {}, {} year(s)",
            trial.start_year_index, trial.duration_years
        );
        print!("{}", TraceTable(&steps));
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

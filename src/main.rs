use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use instant::Duration;

use gridfill::{find_fill, load_word_list, Board, FillError, FillOptions, SelectionPolicy};

/// Fill a crossword template from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template file: one row per line, '.' for open cells, '#' for blocks, letters for
    /// pre-filled cells
    template: PathBuf,

    /// Word list file, one word per line (`word;score` lines are accepted too)
    #[arg(short, long)]
    words: PathBuf,

    /// Shuffle each length group with this seed instead of ordering by letter frequency
    #[arg(short, long)]
    shuffle_seed: Option<u64>,

    /// Maximum number of search states per attempt
    #[arg(short = 'n', long, default_value_t = gridfill::DEFAULT_MAX_ITERATIONS)]
    max_iterations: u64,

    /// Give up on an attempt after this many seconds
    #[arg(short, long)]
    time_limit: Option<f64>,

    /// Extra attempts, each with a differently shuffled word order
    #[arg(short, long, default_value_t = 0)]
    restarts: u32,

    /// Write the filled grid to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the slot records to this file as JSON
    #[arg(long)]
    slots_json: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    gridfill::log::init_logger(cli.debug);

    if let Err(e) = try_main(&cli) {
        match e.downcast_ref::<FillError>() {
            Some(FillError::Config(config_err)) => eprintln!("Error: {}", config_err.display_detailed()),
            _ => eprintln!("Error: {e}"),
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Load the inputs, run the fill, and write whatever outputs were asked for.
fn try_main(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let template_text = fs::read_to_string(&cli.template)
        .map_err(|e| format!("failed to read template from '{}': {}", cli.template.display(), e))?;
    let template = Board::parse(&template_text).map_err(FillError::from)?;

    let words = load_word_list(&cli.words)?;
    log::info!("Loaded {} words from {}", words.len(), cli.words.display());

    let time_limit = cli.time_limit
        .map(Duration::try_from_secs_f64)
        .transpose()
        .map_err(|e| format!("invalid time limit: {e}"))?;

    let options = FillOptions {
        policy: match cli.shuffle_seed {
            Some(seed) => SelectionPolicy::Shuffle { seed },
            None => SelectionPolicy::LetterFrequency,
        },
        max_iterations: Some(cli.max_iterations),
        time_limit,
        restarts: cli.restarts,
    };

    let result = find_fill(&template, &words, &options)?;
    log::info!("{:?}", result.statistics);

    let display_grid = result.board.to_string();
    println!("{}", display_grid);

    if let Some(path) = &cli.output {
        fs::write(path, format!("{display_grid}\n"))?;
        log::info!("Wrote grid to {}", path.display());
    }

    if let Some(path) = &cli.slots_json {
        fs::write(path, serde_json::to_string_pretty(&result.slot_records())?)?;
        log::info!("Wrote slot records to {}", path.display());
    }

    Ok(())
}

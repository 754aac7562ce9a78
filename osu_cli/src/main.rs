use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use osu_import::ImportOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod inspect;

#[derive(Debug, Parser)]
#[command(name = "osu2song")]
#[command(about = "osu!mania beatmap importer", long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Beatmap file extension.
    #[arg(long, default_value = "osu")]
    extension: String,

    /// Required General.Mode value.
    #[arg(long, default_value_t = osu_import::MANIA_MODE)]
    mode: i64,
}

impl ImportArgs {
    fn options(&self) -> ImportOptions {
        ImportOptions {
            extension: self.extension.clone(),
            mania_mode: self.mode,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a song directory and write it as JSON.
    Convert {
        dir: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        import: ImportArgs,
    },
    /// Print the rows of one chart as a lane grid.
    Inspect {
        dir: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        chart: usize,
        #[command(flatten)]
        import: ImportArgs,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("osu_import=debug,osu_cli=debug,warn")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("osu_import=info,osu_cli=info,warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Convert {
            dir,
            output,
            import,
        } => {
            let song = osu_import::load_song_from_dir(&dir, &import.options())
                .with_context(|| format!("convert failed: {}", dir.display()))?;

            let json = serde_json::to_string_pretty(&song).context("failed to serialize song")?;
            let out_path = output.unwrap_or_else(|| default_output_path(&dir));
            fs::write(&out_path, json)
                .with_context(|| format!("failed to write: {}", out_path.display()))?;
            info!(charts = song.charts.len(), output = %out_path.display(), "song written");
        }
        Command::Inspect { dir, chart, import } => {
            let song = osu_import::load_song_from_dir(&dir, &import.options())
                .with_context(|| format!("inspect failed: {}", dir.display()))?;
            inspect::print_chart(&song, chart)?;
        }
    }

    Ok(())
}

fn default_output_path(dir: &Path) -> PathBuf {
    dir.join("song.json")
}

//! PAVI Viewer - Multiple Sequence Alignment Viewer
//!
//! Desktop viewer for protein alignments with variant overlays. Large
//! alignments are virtualized so only the rows near the viewport are drawn.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use app::{JobRequest, Startup, ViewerApp};
use pavi_viewer::analysis::{alignment_stats, parse_alignment, SeqInfoDict};
use pavi_viewer::config::{ViewerConfig, ViewerVariant};
use pavi_viewer::error::{Result, ViewerError};
use pavi_viewer::source::{DirectorySource, JobSource};

/// Viewer for multiple sequence alignments with variant overlays.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Alignment file in Clustal or FASTA format
    #[clap(value_parser)]
    alignment: Option<PathBuf>,

    /// JSON file mapping sequence names to their embedded variants
    #[clap(long, value_parser)]
    variants: Option<PathBuf>,

    /// Job identifier to load from the data directory
    #[clap(short = 'j', long, value_parser, conflicts_with = "alignment")]
    job: Option<String>,

    /// Directory holding `<job>.aln` and `<job>.seqinfo.json` files
    #[clap(short = 'd', long, value_parser, default_value = ".")]
    data_dir: PathBuf,

    /// Viewer configuration file (JSON)
    #[clap(short = 'c', long, value_parser)]
    config: Option<PathBuf>,

    /// Open the full-screen viewer (wider initial window, Escape closes)
    #[clap(long, action)]
    full_screen: bool,

    /// Print alignment statistics as JSON and exit without opening a window
    #[clap(long, action)]
    summary: bool,

    /// Verbosity level (0 = warn, 1 = info, 2 = debug)
    #[clap(short, long, default_value = "0")]
    verbose: u8,
}

/// Variant defaults first, then the config file on top of them
fn load_config(args: &Args) -> Result<ViewerConfig> {
    let base = if args.full_screen {
        ViewerConfig::full_screen()
    } else {
        ViewerConfig::default()
    };
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load_over(&base, path)?,
        None => base,
    };
    if args.full_screen {
        config.variant = ViewerVariant::FullScreen;
    }
    Ok(config)
}

fn load_variants(path: &Path) -> Result<SeqInfoDict> {
    let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Read whatever the command line names; the window shows these on start
fn load_startup(args: &Args) -> Result<Startup> {
    let mut startup = Startup::default();
    if let Some(path) = &args.alignment {
        let text = std::fs::read_to_string(path).map_err(|e| ViewerError::io(path, e))?;
        startup.alignment_text = Some(text);
        startup.alignment_path = Some(path.clone());
    }
    if let Some(path) = &args.variants {
        startup.seq_info = load_variants(path)?;
        startup.variants_path = Some(path.clone());
    }
    if let Some(job) = &args.job {
        startup.job = Some(JobRequest {
            job_id: job.clone(),
            data_dir: args.data_dir.clone(),
        });
    }
    startup.config_path = args.config.clone();
    Ok(startup)
}

fn print_summary(startup: &Startup) -> Result<()> {
    let (text, seq_info) = match &startup.job {
        Some(job) => {
            let data = DirectorySource::new(&job.data_dir).load(&job.job_id)?;
            (data.alignment_text, data.seq_info)
        }
        None => match &startup.alignment_text {
            Some(text) => (text.clone(), startup.seq_info.clone()),
            None => {
                return Err(ViewerError::config(
                    "--summary needs an alignment file or --job",
                ))
            }
        },
    };
    let set = parse_alignment(&text)?;
    let stats = alignment_stats(&set, &seq_info);
    log::info!(
        "Summarized {} sequences x {} columns",
        stats.sequence_count,
        stats.alignment_length
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    let loaded = load_config(&args).and_then(|config| load_startup(&args).map(|s| (config, s)));
    let (config, startup) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.summary {
        return match print_summary(&startup) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let title = match (&startup.job, config.variant) {
        (Some(job), ViewerVariant::FullScreen) => format!("PAVI Alignment - {} (full screen)", job.job_id),
        (Some(job), ViewerVariant::Inline) => format!("PAVI Alignment - {}", job.job_id),
        (None, _) => "PAVI Alignment Viewer".to_string(),
    };
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 800.0])
        .with_min_inner_size([900.0, 600.0])
        .with_title(&title);
    if config.variant == ViewerVariant::FullScreen {
        viewport = viewport.with_maximized(true);
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let result = eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, config, startup)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Viewer exited with error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! gnupipe - render demo plots through gnuplot
//!
//! Starts a gnuplot session and writes two PNG files:
//!
//! - `sine.png`: the equation `sin(x)`
//! - `rand_<N>.png`: N random series plotted against a shared, jittered x axis
//!
//! # Quick Start
//!
//! ```text
//! gnupipe                    # Write into the current directory
//! gnupipe -o /tmp/plots      # Write into /tmp/plots
//! gnupipe -p gnuplot-nox     # Use a different gnuplot binary
//! ```

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use gnupipe::{gnuplot, Config, Session};

/// Command line options
struct Options {
    /// Directory receiving the PNG files
    out_dir: PathBuf,
    /// Plotting program override
    program: Option<String>,
    /// Number of random series
    lines: usize,
    /// Points per random series
    points: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            program: None,
            lines: 5,
            points: 20,
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("gnupipe {}", VERSION);
}

fn print_help() {
    eprintln!("gnupipe {} - render demo plots through gnuplot", VERSION);
    eprintln!();
    eprintln!("Usage: gnupipe [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --out-dir <DIR>   Directory for the PNG files (default: .)");
    eprintln!("  -p, --program <CMD>   Plotting program (default: from config or gnuplot)");
    eprintln!("  -l, --lines <N>       Number of random series (default: 5)");
    eprintln!("  -n, --points <N>      Points per random series (default: 20)");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.gnupipe/config.toml");
    eprintln!("Log file:      ~/.gnupipe/gnupipe.log");
}

fn parse_count(args: &[String], i: usize, name: &str) -> Result<usize, String> {
    let value = args
        .get(i)
        .ok_or_else(|| format!("Missing {} argument", name))?;
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid {}: {}", name, value)),
    }
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-o" | "--out-dir" => {
                i += 1;
                let dir = args.get(i).ok_or("Missing directory argument")?;
                options.out_dir = PathBuf::from(dir);
            }
            "-p" | "--program" => {
                i += 1;
                let program = args.get(i).ok_or("Missing program argument")?;
                options.program = Some(program.clone());
            }
            "-l" | "--lines" => {
                i += 1;
                options.lines = parse_count(&args, i, "line count")?;
            }
            "-n" | "--points" => {
                i += 1;
                options.points = parse_count(&args, i, "point count")?;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Log to `~/.gnupipe/gnupipe.log`; logging is skipped if the file cannot be opened
fn init_logging(config: &Config) {
    let log_path = Config::config_dir()
        .map(|dir| dir.join("gnupipe.log"))
        .unwrap_or_else(|| PathBuf::from("gnupipe.log"));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Xorshift generator for demo data
struct XorShift(u64);

impl XorShift {
    fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        // State must be non-zero
        Self(nanos | 1)
    }

    /// Uniform value in [0, 1)
    fn next_f64(&mut self) -> f64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn run_demo(options: Options, mut config: Config) -> anyhow::Result<()> {
    if let Some(program) = options.program {
        config.program = program;
    }
    // Output goes to PNG files, no display needed
    config.check_display = false;

    std::fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("cannot create {}", options.out_dir.display()))?;

    let mut g = Session::start_with(&config)
        .with_context(|| format!("error starting {}, is it in your PATH?", config.program))?;
    info!("Started {}", config.program);

    let sine = options.out_dir.join("sine.png");
    g.cmd("set terminal png")?;
    gnuplot!(g, "set output \"{}\"", sine.display())?;
    g.cmd("set key box opaque")?;
    g.plot_equation("sin(x)", Some("Sine wave"))?;
    info!("Wrote {}", sine.display());

    g.reset_plot();
    g.set_style("lines");
    let random = options.out_dir.join(format!("rand_{}.png", options.lines));
    gnuplot!(g, "set output \"{}\"", random.display())?;
    g.cmd("set key noopaque")?;

    let mut rng = XorShift::from_clock();
    let x: Vec<f64> = (0..options.points)
        .map(|i| i as f64 + rng.next_f64())
        .collect();
    let ys: Vec<Vec<f64>> = (0..options.lines)
        .map(|j| {
            (0..options.points)
                .map(|_| rng.next_f64() * (j + 1) as f64)
                .collect()
        })
        .collect();
    let names: Vec<String> = (1..=options.lines)
        .map(|j| format!("rand * {}", j))
        .collect();
    let titles: Vec<Option<&str>> = names.iter().map(|n| Some(n.as_str())).collect();

    let drawn = g.plot_x_multi_y(&x, &ys, Some(titles.as_slice()))?;
    info!("Wrote {} ({} series)", random.display(), drawn);

    match g.close() {
        Ok(()) => info!("Session closed"),
        Err(e) => error!("Session close failed: {}", e),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let config = Config::load();
    init_logging(&config);
    info!("gnupipe {} starting...", VERSION);

    run_demo(options, config)
}

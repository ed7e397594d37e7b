use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use core_sitemap::common::logging::setup_logging;
use core_sitemap::common::max_records::get_max_records;
use core_sitemap::input::parse_line;
use core_sitemap::{
    DEFAULT_MULTI_FILE_PATTERN, DEFAULT_PING_ENDPOINT, DEFAULT_SINGLE_FILE_NAME, Notifier, PingNotifier, Runner,
    RunnerOptions,
};

#[derive(Parser)]
#[command(name = "core-sitemap")]
#[command(about = "Generate XML sitemaps and sitemap indexes", long_about = None)]
struct CoreCli {
    #[command(subcommand)]
    command: Commands,
    /// Print progress while generating
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sitemap files from a list of URLs (one per line, bare URL or JSON object).
    Generate(GenerateArgs),

    /// Ping the search engine about an already published sitemap.
    Ping {
        /// Public URL of the sitemap directory, e.g. https://example.com/sitemaps/
        #[arg(short, long)]
        base_url: String,
        /// File name of the sitemap (or index) inside that directory.
        #[arg(short, long, default_value = DEFAULT_SINGLE_FILE_NAME)]
        name: String,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Directory the sitemap files are written to.
    #[arg(short, long)]
    output_dir: PathBuf,
    /// Public URL of the output directory.
    #[arg(short, long)]
    base_url: String,
    /// Input file with one URL entry per line ("-" for stdin).
    #[arg(short, long, value_parser = validate_input_file)]
    input: PathBuf,
    /// Maximum URLs per sitemap file (default: $SITEMAP_MAX_RECORDS or 50000).
    #[arg(short, long)]
    max_records: Option<usize>,
    /// Resolve a relative output directory against the working directory.
    #[arg(long)]
    allow_relative_paths: bool,
    /// Name of a lone sitemap file and of the index.
    #[arg(long, default_value = DEFAULT_SINGLE_FILE_NAME)]
    single_name: String,
    /// Name pattern of numbered sitemap files; must contain %d.
    #[arg(long, default_value = DEFAULT_MULTI_FILE_PATTERN)]
    multi_pattern: String,
    /// Ping the search engine once the files are written.
    #[arg(long)]
    ping: bool,
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if s == "-" {
        return Ok(path);
    }

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

fn main() {
    dotenvy::dotenv().ok();
    setup_logging("core_sitemap=info");

    let cli = CoreCli::parse();

    match cli.command {
        Commands::Generate(args) => {
            if let Err(e) = generate(args, cli.verbose) {
                eprintln!("ERROR: {e}");
                std::process::exit(1)
            }
        }

        Commands::Ping { base_url, name } => {
            let sitemap_url = format!("{}{}", core_sitemap::ensure_trailing_slash(&base_url), name);
            if !core_sitemap::is_valid_web_url(&sitemap_url) {
                eprintln!("ERROR: Not a valid sitemap URL: {sitemap_url}");
                std::process::exit(1)
            }
            notifier().notify(&sitemap_url);
            println!("Pinged {DEFAULT_PING_ENDPOINT} for {sitemap_url}");
        }
    }
}

fn notifier() -> PingNotifier {
    PingNotifier::with_timeout(DEFAULT_PING_ENDPOINT, Duration::from_secs(30))
}

fn generate(args: GenerateArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let max_records = match args.max_records {
        Some(n) => n,
        None => get_max_records()?,
    };

    let options = RunnerOptions::builder()
        .verbose(verbose)
        .allow_relative_paths(args.allow_relative_paths)
        .max_records_per_page(max_records)
        .single_file_name(args.single_name)
        .multi_file_pattern(args.multi_pattern)
        .build();
    let mut runner = Runner::with_locations(&args.output_dir, &args.base_url, options)?;

    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(std::io::BufReader::new(std::fs::File::open(&args.input)?))
    };

    for (i, line) in reader.lines().enumerate() {
        if let Some(url) = parse_line(&line?, i + 1)? {
            runner.push(url)?;
        }
    }

    let summary = runner.end()?;
    println!(
        "Wrote {} URLs into {} sitemap file(s); entry point: {}",
        summary.total_records(),
        summary.page_count(),
        summary.entry_point()
    );

    if args.ping {
        summary.ping_notify(&notifier())?;
    }
    Ok(())
}

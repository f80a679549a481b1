//! mmd CLI - Render Multi-Markdown tables to HTML

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use multimd::{parse_with_diagnostics, ParseWarning, TableOptions};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mmd")]
#[command(version)]
#[command(about = "mmd - Render Multi-Markdown tables to HTML", long_about = None)]
struct Cli {
    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    /// Rows ending in a backslash continue on the next line
    #[arg(long)]
    multiline: bool,

    /// `^^` cells extend the cell above
    #[arg(long)]
    rowspan: bool,

    /// Allow tables without a header row
    #[arg(long)]
    headerless: bool,

    /// Keep blank lines inside a single table body
    #[arg(long)]
    single_body: bool,

    /// Do not derive caption ids from caption text
    #[arg(long)]
    no_autolabel: bool,

    /// Comma-separated option list, e.g. "multiline,no-multibody,max-depth=4".
    /// Applied before the individual flags.
    #[arg(long, value_name = "LIST")]
    options: Option<String>,

    /// Print the token stream as JSON instead of HTML
    #[arg(long)]
    tokens: bool,

    /// Strict mode: exit with error if any parse warnings occur
    #[arg(long)]
    strict: bool,

    /// Quiet mode: suppress warning output to stderr
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(feature = "cli")]
impl Cli {
    fn table_options(&self) -> Result<TableOptions, multimd::MarkdownError> {
        let mut options = match self.options {
            Some(ref list) => list.parse::<TableOptions>()?,
            None => TableOptions::default(),
        };

        options.multiline |= self.multiline;
        options.rowspan |= self.rowspan;
        options.headerless |= self.headerless;
        if self.single_body {
            options.multibody = false;
        }
        if self.no_autolabel {
            options.autolabel = false;
        }

        Ok(options)
    }
}

#[cfg(feature = "cli")]
fn setup_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let options = match cli.table_options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(2);
        }
    };

    // Read input
    let input = match cli.input_file {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    tracing::debug!(?options, bytes = input.len(), "parsing input");
    let (tokens, warnings) = parse_with_diagnostics(&input, &options);

    // Print warnings to stderr (unless quiet mode)
    if !cli.quiet && !warnings.is_empty() {
        print_warnings_to_stderr(&warnings);
    }

    // Check strict mode
    if cli.strict && !warnings.is_empty() {
        eprintln!("Error: {} parse warning(s) in strict mode", warnings.len());
        std::process::exit(1);
    }

    let result = if cli.tokens {
        serde_json::to_string_pretty(&tokens).map_err(io::Error::other)?
    } else {
        multimd::core::render(&tokens)
    };

    // Output
    match cli.output {
        Some(path) => {
            let mut file = fs::File::create(&path)?;
            write!(file, "{}", result)?;
            if warnings.is_empty() {
                eprintln!("✓ Output written to: {}", path);
            } else {
                eprintln!(
                    "⚠ Output written to: {} ({} warning(s))",
                    path,
                    warnings.len()
                );
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            write!(stdout, "{}", result)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_warnings_to_stderr(warnings: &[ParseWarning]) {
    eprintln!();
    eprintln!("Parse Warnings ({}):", warnings.len());
    eprintln!();
    for warning in warnings {
        eprintln!("  {}", warning);
    }
    eprintln!();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install multimd --features cli");
    eprintln!("  mmd [OPTIONS] [INPUT_FILE]");
}

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::*;
use simplelog::*;

use wash_lib::config::{BrowserType, SessionSettings, WashOptions};
use wash_lib::session::{StaticDocumentFactory, WebDriverLauncher};
use wash_lib::{Result, Wash};

#[derive(Parser)]
#[command(name = "wash", version, about = "Run WASH web automation and scraping scripts")]
struct Cli {
    /// Sets the level of verbosity
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Debug/trace output, attaches the script source to the result.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script and print its result as JSON.
    Execute {
        script_file: PathBuf,

        /// Path to WebDriver executable.
        #[arg(long = "web_driver_path", required_unless_present = "static_document")]
        web_driver_path: Option<PathBuf>,

        /// Browser type.
        #[arg(long = "browser_type", value_enum, ignore_case = true, default_value = "chrome")]
        browser_type: BrowserArg,

        /// Parse the document without a browser. Only file and inline html documents.
        #[arg(long = "static")]
        static_document: bool,
    },
    /// Parse and validate a script without running it.
    Validate { script_file: PathBuf },
    /// Print the version.
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BrowserArg {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Safari,
}

impl From<BrowserArg> for BrowserType {
    fn from(browser: BrowserArg) -> Self {
        match browser {
            BrowserArg::Chrome => BrowserType::Chrome,
            BrowserArg::Firefox => BrowserType::Firefox,
            BrowserArg::Edge => BrowserType::Edge,
            BrowserArg::Opera => BrowserType::Opera,
            BrowserArg::Safari => BrowserType::Safari,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let verbosity = if cli.debug { cli.verbose.max(2) } else { cli.verbose };
    let log_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    CombinedLogger::init(vec![TermLogger::new(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )])
    .expect("logger");

    if let Err(err) = run(cli.command, cli.debug) {
        error!("{}", err);
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run(command: Commands, debug: bool) -> Result<()> {
    match command {
        Commands::Execute {
            script_file,
            web_driver_path,
            browser_type,
            static_document,
        } => {
            let now = Instant::now();
            let wash = Wash::from_file(&script_file)?.debug(debug);

            let result = if static_document {
                wash.execute(&StaticDocumentFactory)?
            } else {
                let mut options = WashOptions::default();
                options.default_browser = browser_type.into();
                if let Some(path) = web_driver_path {
                    options.set_driver_path(browser_type.into(), path);
                }
                let settings = SessionSettings::resolve(wash.script(), options.default_browser)?;
                wash.execute(&WebDriverLauncher::new(options, settings))?
            };
            println!("{}", result.to_json_pretty()?);

            info!("execution spent: {}ms", now.elapsed().as_millis());
            eprintln!("WASH Script executed successfully. ({})", script_file.display());
        }
        Commands::Validate { script_file } => {
            Wash::from_file(&script_file)?;
            eprintln!("WASH Script is validated successfully. ({})", script_file.display());
        }
        Commands::Version => {
            println!("wash {}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

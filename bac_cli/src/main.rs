mod session;

use bac_core::input::{parse_sex, parse_weight};
use bac_core::*;
use clap::{Parser, Subcommand};
use session::{Flow, Session, DISCLAIMER};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bac")]
#[command(about = "Blood alcohol concentration estimator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print status as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive drinking session (default)
    Session {
        /// Body weight in kg for this session (comma or period decimals)
        #[arg(long)]
        weight: Option<String>,

        /// Sex for this session (male, female)
        #[arg(long)]
        sex: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    bac_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Session { weight, sex }) => {
            let config = load_config(cli.config.as_deref())?;
            cmd_session(&config, weight, sex, cli.json)
        }
        Some(Commands::Config { init }) => cmd_config(cli.config, init),
        None => {
            // Default to "session" command
            let config = load_config(cli.config.as_deref())?;
            cmd_session(&config, None, None, cli.json)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn cmd_session(
    config: &Config,
    weight: Option<String>,
    sex: Option<String>,
    json: bool,
) -> Result<()> {
    let mut engine = BacEngine::with_clock(
        SystemClock,
        config.engine_settings(),
        config.weight_bounds(),
    );

    // Command-line overrides are permissive like session input: bad values keep the profile
    let weight_override = weight.as_deref().and_then(|w| {
        let parsed = parse_weight(w, &config.weight_bounds());
        if parsed.is_none() {
            eprintln!("Ignoring weight '{}', using {} kg", w, config.profile.weight_kg);
        }
        parsed
    });
    let sex_override = sex.as_deref().and_then(|s| {
        let parsed = parse_sex(s);
        if parsed.is_none() {
            eprintln!("Ignoring sex '{}', using {}", s, config.profile.sex);
        }
        parsed
    });
    let settings = engine.update_settings(weight_override, sex_override);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout().lock();

    writeln!(
        stdout,
        "BAC session started ({} kg, {}). Type 'help' for commands.",
        settings.weight_kg, settings.sex
    )?;
    writeln!(stdout, "{}", DISCLAIMER)?;

    let mut session = Session::new(engine, json);
    if interactive {
        write!(stdout, "> ")?;
        stdout.flush()?;
    }

    for line in stdin.lock().lines() {
        let line = line?;
        if session.handle_line(&line, &mut stdout)? == Flow::Stop {
            break;
        }
        if interactive {
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
    }

    writeln!(stdout, "Session ended.")?;
    tracing::debug!(
        "Session ended at {:.3} g",
        session.engine().grams_of_alcohol()
    );
    Ok(())
}

fn cmd_config(path: Option<PathBuf>, init: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
            return Ok(());
        }
        Config::default().save_to(&path)?;
        println!("✓ Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    println!("# {}", path.display());
    let contents = toml::to_string_pretty(&config)?;
    print!("{}", contents);
    Ok(())
}

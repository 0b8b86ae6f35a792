//! Mailwave replay shell
//!
//! Feeds a recorded script of surface events through the mailboxes window
//! and prints what the window decided for each one as JSON.

mod platform;
mod replay;

use anyhow::{bail, Context, Result};
use mailwave_core::ShellConfig;
use mailwave_policy::AccountsSnapshot;
use mailwave_shell::MailboxesWindow;
use platform::SystemHost;
use replay::Script;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "usage: mailwave --script <events.json> [--accounts <accounts.json>] \
[--config <shell.json>] [--open-external]";

struct Args {
    config: Option<PathBuf>,
    accounts: Option<PathBuf>,
    script: Option<PathBuf>,
    open_external: bool,
    help: bool,
}

impl Args {
    fn parse() -> Self {
        Self::parse_from(std::env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Self {
        let mut args = args.into_iter();
        let mut parsed = Args {
            config: None,
            accounts: None,
            script: None,
            open_external: false,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => parsed.config = args.next().map(PathBuf::from),
                "--accounts" => parsed.accounts = args.next().map(PathBuf::from),
                "--script" => parsed.script = args.next().map(PathBuf::from),
                "--open-external" => parsed.open_external = true,
                "-h" | "--help" => parsed.help = true,
                other => eprintln!("Ignoring unknown argument: {}", other),
            }
        }

        parsed
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mailwave").join("shell.json"))
}

fn load_config(path: Option<&PathBuf>) -> Result<ShellConfig> {
    let config = match path {
        Some(path) => ShellConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match default_config_path() {
            Some(path) => ShellConfig::load_or_default(&path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ShellConfig::default(),
        },
    };
    Ok(config)
}

fn init_logging() -> Result<()> {
    tracing_log::LogTracer::init().context("setting log tracer")?;
    let filter = EnvFilter::try_from_env("MAILWAVE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    init_logging()?;
    info!("Starting Mailwave replay...");

    let Some(script_path) = args.script.as_ref() else {
        bail!("missing --script\n{}", USAGE);
    };

    let config = load_config(args.config.as_ref())?;
    let accounts = match args.accounts.as_ref() {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading accounts {}", path.display()))?;
            AccountsSnapshot::from_json(&json)?
        }
        None => AccountsSnapshot::new(),
    };
    let script = Script::load(script_path)
        .with_context(|| format!("loading script {}", script_path.display()))?;

    info!(
        "Replaying {} steps against {} mailboxes",
        script.steps.len(),
        accounts.mailboxes.len()
    );

    let mut window = MailboxesWindow::new(config);
    let mut host = SystemHost::new(!args.open_external);
    let reports = replay::replay(&mut window, &accounts, &mut host, &script);

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

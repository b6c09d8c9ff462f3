//! CLI entry point: pipe one message from the MTA into the ticket API.
//!
//! Exit status follows sysexits: 0 when the ticket was accepted, 65
//! (`EX_DATAERR`) when the message is rejected, 78 (`EX_CONFIG`) when the
//! program is misconfigured.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::AsyncRead;

use email_ticket::{HttpSubmitter, InboundMail, Outcome, Settings, StdoutSubmitter, Worker};

const EX_DATAERR: u8 = 65;
const EX_CONFIG: u8 = 78;

#[derive(Parser)]
#[command(name = "email-ticket", version, about = "Turn an email read from stdin into a help-desk ticket")]
struct Cli {
    /// TOML file with `endpoint`, `api_key` and `timeout_secs`
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Ticket API URL
    #[arg(long, env = "TICKET_API_URL")]
    endpoint: Option<String>,

    /// Credential for `Authorization: Basic`
    #[arg(long, env = "TICKET_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds (0 for none)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Envelope sender, as passed by the MTA
    #[arg(long, default_value = "")]
    sender: String,

    /// Envelope recipient, as passed by the MTA
    #[arg(long, default_value = "")]
    recipient: String,

    /// Print the ticket JSON to stdout instead of posting it
    #[arg(long)]
    print: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The message on stdin; a rejection is remembered for the exit status
struct StdinMail {
    sender: String,
    recipient: String,
    stdin: tokio::io::Stdin,
    rejection: Option<String>,
}

impl InboundMail for StdinMail {
    fn envelope_from(&self) -> &str {
        &self.sender
    }

    fn envelope_to(&self) -> &str {
        &self.recipient
    }

    fn raw_size(&self) -> usize {
        0
    }

    fn raw(&mut self) -> &mut (dyn AsyncRead + Unpin + Send) {
        &mut self.stdin
    }

    fn set_reject(&mut self, reason: &str) {
        self.rejection = Some(reason.to_string());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("email-ticket: {e:#}");
            ExitCode::from(EX_CONFIG)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut mail = StdinMail {
        sender: cli.sender,
        recipient: cli.recipient,
        stdin: tokio::io::stdin(),
        rejection: None,
    };

    let outcome = if cli.print {
        Worker::new(StdoutSubmitter).process(&mut mail).await
    } else {
        let mut settings = Settings {
            endpoint: cli.endpoint,
            api_key: cli.api_key,
            timeout_secs: cli.timeout,
        };
        if let Some(path) = &cli.config {
            settings = settings.or(Settings::load(path)?);
        }
        let config = settings.into_config()?;
        tracing::debug!("Using {config:?}");
        Worker::new(HttpSubmitter::from_config(&config)?)
            .process(&mut mail)
            .await
    };

    if let Outcome::Rejected(e) = &outcome {
        tracing::debug!("Rejection cause: {e:?}");
    }
    match mail.rejection {
        Some(reason) => {
            eprintln!("{reason}");
            Ok(ExitCode::from(EX_DATAERR))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

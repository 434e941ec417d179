use anyhow::Context;
use clap::{Parser, Subcommand};
use mail_dispatch::config::Config;
use mail_dispatch::manifest::Manifest;
use mail_dispatch::mime::Message;
use mail_dispatch::smtp::Dispatcher;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Compose and send emails through an SMTP server
#[derive(Debug, Parser)]
#[command(name = "mail-dispatch", version)]
struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a single message
    Send {
        #[arg(long)]
        from: String,
        #[arg(long, value_delimiter = ',')]
        to: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        cc: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        bcc: Vec<String>,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
        /// Attachment as `path` or `path:content/type`
        #[arg(long)]
        attach: Vec<String>,
    },
    /// Send every message listed in a TOML manifest concurrently
    Batch {
        manifest: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)?
    } else {
        Config::default()
    };
    config.apply_env_overrides()?;

    mail_dispatch::logging::init(&config.logging)?;

    info!("Starting mail-dispatch");
    info!("  SMTP server: {}", config.smtp.address());
    if let Some(timeout) = config.dispatch.timeout() {
        info!("  Send timeout: {:?}", timeout);
    }
    if let Some(limit) = config.dispatch.max_concurrency {
        info!("  Max concurrent sends: {}", limit);
    }

    let dispatcher = Dispatcher::new(config.smtp.clone()).with_options(config.dispatch.clone());

    match cli.command {
        Command::Send {
            from,
            to,
            cc,
            bcc,
            subject,
            body,
            attach,
        } => {
            let mut msg = Message::new()
                .from(from)
                .to(to)
                .cc(cc)
                .bcc(bcc)
                .subject(subject)
                .body(body);

            for arg in attach {
                let (path, content_type) = split_attachment_arg(&arg);
                if let Err(e) = msg.attach_file(path, content_type) {
                    warn!("Skipping attachment: {}", e);
                }
            }

            dispatcher
                .send_one(&msg)
                .await
                .context("Failed to send message")?;
            info!("Message sent");
        }
        Command::Batch { manifest } => {
            let messages = Manifest::from_file(&manifest)?.into_messages();
            let total = messages.len();

            let failures = dispatcher.send_batch(messages).await;
            for failure in &failures {
                error!("{}", failure);
            }

            if !failures.is_empty() {
                anyhow::bail!("{} of {} messages failed", failures.len(), total);
            }
            info!("All {} messages sent", total);
        }
    }

    Ok(())
}

/// Split `path[:content/type]`, defaulting to `application/octet-stream`
fn split_attachment_arg(arg: &str) -> (&str, &str) {
    match arg.rsplit_once(':') {
        Some((path, content_type)) if content_type.contains('/') => (path, content_type),
        _ => (arg, "application/octet-stream"),
    }
}

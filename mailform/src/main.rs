use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use mailform::commands::{email::EmailCommand, serve::serve, submit::submit};
use mailform_utils::mailform_version;
use sentry::integrations::tracing::EventFilter;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(
            shell,
            &mut Cli::command(),
            env!("CARGO_BIN_NAME"),
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    init_tracing();

    let config = mailform_config::load().context("Failed to load config")?;

    let _sentry_guard = config.sentry.as_ref().map(|sentry_config| {
        sentry::init((
            sentry_config.dsn.as_str(),
            sentry::ClientOptions {
                release: Some(mailform_version().into()),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    match cli.command {
        Command::Serve => serve(config).await?,
        Command::Submit {
            name,
            email,
            endpoint,
            timeout,
        } => submit(config, name, email, endpoint, timeout).await?,
        Command::Email { command } => command.invoke(config).await?,
        Command::CheckConfig { verbose } => {
            let credentials = mailform_config::load_credentials();
            verbose.then(|| println!("{config:#?}\n{credentials:#?}"));
            credentials.context("Invalid SendGrid credentials")?;
        }
        Command::Completion { .. } => unreachable!(),
    }

    Ok(())
}

#[derive(Debug, Parser)]
#[command(version = mailform_version())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the REST API server hosting the send-email endpoint
    #[command(aliases(["run", "start", "s"]))]
    Serve,
    /// Fill in the contact form and submit it to a running server
    Submit {
        /// Full name of the recipient
        name: String,
        /// Email address of the recipient
        email: String,
        /// URL of the send-email endpoint [default: client.endpoint from the config]
        #[arg(long)]
        endpoint: Option<Url>,
        /// How long to wait for a response, e.g. "15s" [default: client.timeout from the config]
        #[arg(long)]
        timeout: Option<mailform_config::Duration>,
    },
    /// Test email deliverability
    #[command(aliases(["e"]))]
    Email {
        #[command(subcommand)]
        command: EmailCommand,
    },
    /// Validate configuration and SendGrid credentials
    CheckConfig {
        /// Print a debug representation of the config
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    #[cfg(pretty_logs)]
    let fmt_layer = fmt_layer.pretty();

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(EnvFilter::from_default_env()))
        .with(
            sentry::integrations::tracing::layer().event_filter(|meta| match *meta.level() {
                Level::ERROR => EventFilter::Exception,
                Level::WARN => EventFilter::Event,
                Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
                Level::TRACE => EventFilter::Ignore,
            }),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_submit() {
        let cli = Cli::try_parse_from([
            "mailform",
            "submit",
            "Max Mustermann",
            "max.mustermann@example.de",
            "--timeout",
            "500ms",
        ])
        .unwrap();

        let Command::Submit {
            name,
            email,
            endpoint,
            timeout,
        } = cli.command
        else {
            panic!("expected submit command");
        };
        assert_eq!(name, "Max Mustermann");
        assert_eq!(email, "max.mustermann@example.de");
        assert_eq!(endpoint, None);
        assert_eq!(timeout.unwrap().as_millis(), 500);
    }
}

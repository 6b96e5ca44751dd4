use clap::Parser;
use credvault::cli::{Cli, Commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with tokens or tables on stdout.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(credvault::cli::log_filter(cli.verbose)));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::List => credvault::cli::commands::list::execute(&cli),
        Commands::Create { ref name } => credvault::cli::commands::create::execute(&cli, name),
        Commands::Delete { ref name, force } => {
            credvault::cli::commands::delete::execute(&cli, name, force)
        }
        Commands::Lock { ref name } => credvault::cli::commands::lock::execute(&cli, name),
        Commands::Unlock { ref name } => credvault::cli::commands::unlock::execute(&cli, name),
        Commands::Store {
            ref vault,
            ref key,
            ref value,
        } => credvault::cli::commands::store::execute(&cli, vault, key, value.as_deref()),
        Commands::View { ref vault } => credvault::cli::commands::view::execute(&cli, vault),
        Commands::Remove {
            ref vault,
            ref key,
            force,
        } => credvault::cli::commands::remove::execute(&cli, vault, key, force),
        Commands::Share { ref vault } => credvault::cli::commands::share::execute(&cli, vault),
        Commands::Receive { ref token } => {
            credvault::cli::commands::receive::execute(&cli, token.as_deref())
        }
        Commands::Version => credvault::cli::commands::version::execute(),
        Commands::Completions { shell } => credvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(kind = ?e.kind(), "command failed");
        credvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

use clap::Parser;
use dramatis::{ControllerOptions, SessionController};
use tracing_subscriber::EnvFilter;

mod backend;
mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dramatis=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let services = backend::create_services(&cli)?;

    // The CLI is a browsing client, so anonymous read access is allowed;
    // mutations still require a session with matching ownership.
    let controller = SessionController::with_options(
        services.auth.clone(),
        services.directory.clone(),
        services.store.clone(),
        ControllerOptions {
            allow_anonymous_browsing: true,
        },
    );
    controller.subscribe(output::print_event);

    // Establish a session: explicit credentials win, otherwise whatever the
    // backend still holds (the local backend remembers the signed-in user).
    let result = match &cli.command {
        Commands::Register(args) => commands::account::register(&controller, args).await,
        Commands::Login(args) => commands::account::login(&controller, args).await,
        other => {
            match (&cli.email, &cli.password) {
                (Some(email), Some(password)) => {
                    controller.login(email, password).await.map(|_| ())?;
                }
                _ => {
                    controller.restore_session().await?;
                }
            }
            match other {
                Commands::Logout => commands::account::logout(&controller).await,
                Commands::Whoami => commands::account::whoami(&controller).await,
                Commands::Libraries => commands::library::libraries(&controller).await,
                Commands::Characters(args) => {
                    commands::library::characters(&controller, args).await
                }
                Commands::Create(args) => commands::library::create(&controller, args).await,
                Commands::Delete(args) => commands::library::delete(&controller, args).await,
                Commands::Register(_) | Commands::Login(_) => unreachable!(),
            }
        }
    };

    services.persist()?;

    if let Err(err) = result {
        // The event renderer already surfaced the user-facing notice.
        tracing::debug!(error = %err, "command failed");
        std::process::exit(1);
    }
    Ok(())
}

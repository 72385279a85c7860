/// MIRA - film streaming service
use anyhow::Context;
use clap::Parser;
use mira::{
    cli::{self, Cli, Command},
    config::ServerConfig,
    context::AppContext,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mira=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = Cli::parse().command();

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    let ctx = AppContext::new(config)
        .await
        .context("failed to initialize application context")?;

    match command {
        Command::Serve => {
            print_banner();
            server::serve(ctx).await.context("server exited with an error")?;
        }
        Command::CreateUser { email, name, admin } => {
            let user = cli::create_user(&ctx, &email, name.as_deref(), admin)
                .await
                .context("failed to create user")?;
            println!("{} {}", user.id, user.role.as_str());
        }
        Command::IssueToken { email } => {
            let token = cli::issue_token(&ctx, &email)
                .await
                .context("failed to issue session token")?;
            println!("{}", token);
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    __  ___________  ___
   /  |/  /  _/ __ \/   |
  / /|_/ // // /_/ / /| |
 / /  / // // _, _/ ___ |
/_/  /_/___/_/ |_/_/  |_|

        Film streaming service v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Command-line interface
///
/// `mira` with no subcommand runs the server. The other subcommands are
/// operator tooling: sign-in happens outside MIRA, so accounts and session
/// tokens are minted here.
use crate::{
    context::AppContext,
    db::models::{User, UserRole},
    error::MiraResult,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "MIRA film streaming service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// Create an account
    CreateUser {
        #[arg(long, help = "Email address, unique per account")]
        email: String,
        #[arg(long, help = "Display name")]
        name: Option<String>,
        #[arg(long, help = "Grant the ADMIN role")]
        admin: bool,
    },
    /// Print a session token for an existing account
    IssueToken {
        #[arg(long, help = "Email address of the account")]
        email: String,
    },
}

impl Cli {
    /// The subcommand to run, `serve` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

pub async fn create_user(
    ctx: &AppContext,
    email: &str,
    name: Option<&str>,
    admin: bool,
) -> MiraResult<User> {
    let user = ctx.accounts.create_user(name, Some(email), None).await?;
    if !admin {
        return Ok(user);
    }

    ctx.accounts.set_role(&user.id, UserRole::Admin).await?;
    ctx.accounts.get_user(&user.id).await
}

pub async fn issue_token(ctx: &AppContext, email: &str) -> MiraResult<String> {
    let user = ctx.accounts.find_by_email(email).await?;
    ctx.accounts.issue_session(&user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ServerConfig, db, error::MiraError};

    async fn context() -> AppContext {
        let pool = db::create_memory_pool().await.unwrap();
        AppContext::with_parts(
            ServerConfig::for_tests("0123456789abcdef0123456789abcdef"),
            pool,
            None,
        )
    }

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["mira"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    fn test_parse_create_user() {
        let cli = Cli::try_parse_from([
            "mira",
            "create-user",
            "--email",
            "root@mira.test",
            "--admin",
        ])
        .unwrap();

        assert_eq!(
            cli.command(),
            Command::CreateUser {
                email: "root@mira.test".to_string(),
                name: None,
                admin: true,
            }
        );
        assert!(Cli::try_parse_from(["mira", "issue-token"]).is_err());
    }

    #[tokio::test]
    async fn test_created_admin_token_validates() {
        let ctx = context().await;

        let user = create_user(&ctx, "root@mira.test", Some("Root"), true)
            .await
            .unwrap();
        assert!(user.role.is_admin());

        let token = issue_token(&ctx, "root@mira.test").await.unwrap();
        let session = ctx.accounts.validate_session(&token).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(session.is_admin());

        assert!(matches!(
            issue_token(&ctx, "nobody@mira.test").await,
            Err(MiraError::NotFound(_))
        ));
    }
}

//! Login session commands.

use clap::Subcommand;

use haberdash_client::SessionStore;
use haberdash_client::types::{Credentials, Registration};

use super::CliError;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in and persist the auth token
    Login {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account (also logs in)
    Register {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Log out and discard the persisted token
    Logout,
    /// Show the logged-in user
    Whoami,
}

pub async fn run(action: AuthAction, session: &SessionStore) -> Result<(), CliError> {
    match action {
        AuthAction::Login { username, password } => {
            let user = session.login(&Credentials::new(username, password)).await?;
            tracing::info!("Logged in as {} <{}>", user.username, user.email);
        }
        AuthAction::Register {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = Registration {
                username,
                email,
                password: password.into(),
                first_name,
                last_name,
            };
            let user = session.register(&registration).await?;
            tracing::info!("Account created, logged in as {}", user.username);
        }
        AuthAction::Logout => {
            session.logout().await;
            tracing::info!("Logged out");
        }
        AuthAction::Whoami => match session.current_user().await {
            Some(user) => {
                tracing::info!(
                    "{} <{}>{}",
                    user.username,
                    user.email,
                    if user.is_staff { " (staff)" } else { "" }
                );
            }
            None => return Err(CliError::NotLoggedIn),
        },
    }
    Ok(())
}

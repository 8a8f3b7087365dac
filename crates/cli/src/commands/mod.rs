//! CLI command implementations.
//!
//! Commands report results through `tracing` rather than `println!`; the
//! subscriber installed in `main` formats them for the terminal.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// The backend rejected the request or the network failed.
    #[error("{}", .0.user_message())]
    Api(#[from] haberdash_client::ApiError),

    /// The command needs a logged-in session.
    #[error("Not logged in. Run `haberdash auth login` first.")]
    NotLoggedIn,

    /// The command needs a staff account.
    #[error("This command requires a staff account.")]
    NotStaff,

    /// The cart mutation was rejected; the message is user-facing.
    #[error("{0}")]
    Cart(String),
}

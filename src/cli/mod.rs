// CLI module for administrative operations requiring server access

pub mod email;
pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;

/// Helpdesk backend: HTTP server and administrative commands
#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Helpdesk ticketing backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// User account management
    #[command(subcommand)]
    User(UserCommands),

    /// Outbound email checks
    #[command(subcommand)]
    Email(EmailCommands),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user account
    Create {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        department: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Grant the IT staff capability
        #[arg(long)]
        staff: bool,
    },

    /// Grant or revoke the IT staff capability
    SetStaff {
        username: String,
        #[arg(action = clap::ArgAction::Set)]
        is_staff: bool,
    },
}

#[derive(Subcommand)]
pub enum EmailCommands {
    /// Send a test message through the configured transport
    Test {
        #[arg(long)]
        to: String,
    },
}

/// Execute an administrative CLI command
///
/// `Serve` and `Migrate` are handled by main before AppData exists.
pub async fn execute_command(
    command: Commands,
    app_data: std::sync::Arc<AppData>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve | Commands::Migrate => {
            return Err("serve and migrate are not administrative commands".into());
        }
        Commands::User(UserCommands::Create {
            username,
            email,
            first_name,
            last_name,
            department,
            password,
            staff,
        }) => {
            user::create_user(
                app_data,
                user::CreateUserArgs {
                    username,
                    email,
                    first_name,
                    last_name,
                    department,
                    password,
                    staff,
                },
            )
            .await?;
        }
        Commands::User(UserCommands::SetStaff { username, is_staff }) => {
            user::set_staff(app_data, &username, is_staff).await?;
        }
        Commands::Email(EmailCommands::Test { to }) => {
            email::send_test_email(&app_data, &to).await?;
        }
    }

    Ok(())
}

// User management CLI commands

use std::io::{self, Write};
use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::UserCoordinator;
use crate::types::internal::context::RequestContext;
use crate::types::internal::user::Registration;

pub struct CreateUserArgs {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: Option<String>,
    pub password: Option<String>,
    pub staff: bool,
}

/// Create an account through the regular registration workflow
///
/// Welcome and new-user notifications are sent exactly as for self-service
/// registration. With `--staff` the staff flag is set afterwards.
pub async fn create_user(
    app_data: Arc<AppData>,
    args: CreateUserArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("user_create");
    let coordinator = UserCoordinator::new(app_data);

    let password = match args.password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let (user, _profile) = coordinator
        .register(
            &ctx,
            Registration {
                username: args.username,
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                password,
                department: args.department,
                phone_number: None,
            },
        )
        .await?;

    println!("✓ User created");
    println!("  Username: {}", user.username);
    println!("  User ID:  {}", user.id);

    if args.staff {
        coordinator.set_staff(&ctx, &user.username, true).await?;
        println!("  IT staff: yes");
    }

    Ok(())
}

pub async fn set_staff(
    app_data: Arc<AppData>,
    username: &str,
    is_staff: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RequestContext::for_cli("user_set_staff");
    let coordinator = UserCoordinator::new(app_data);

    coordinator.set_staff(&ctx, username, is_staff).await?;

    if is_staff {
        println!("✓ {} is now IT staff", username);
    } else {
        println!("✓ {} is no longer IT staff", username);
    }
    Ok(())
}

fn prompt_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }
    Ok(password)
}

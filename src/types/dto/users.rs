use poem_openapi::Object;

use crate::types::db::{profile, ticket, ticket_notification, user};

/// Request model for self-service registration
#[derive(Object, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[oai(default)]
    pub first_name: String,
    #[oai(default)]
    pub last_name: String,
    /// At least 8 characters
    pub password: String,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

/// Public view of a user; never includes the password hash
#[derive(Object, Debug, Clone)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Full name, or the username when no name is set
    pub display_name: String,
}

impl From<&user::Model> for UserResponse {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            display_name: user.display_name(),
        }
    }
}

#[derive(Object, Debug)]
pub struct ProfileResponse {
    pub department: Option<String>,
    pub is_it_staff: bool,
    pub phone_number: Option<String>,
    pub dark_mode: bool,
}

impl From<&profile::Model> for ProfileResponse {
    fn from(profile: &profile::Model) -> Self {
        Self {
            department: profile.department.clone(),
            is_it_staff: profile.is_it_staff,
            phone_number: profile.phone_number.clone(),
            dark_mode: profile.dark_mode,
        }
    }
}

/// A user together with their profile
#[derive(Object, Debug)]
pub struct AccountResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
}

/// Profile fields to change; omitted fields stay as they are
#[derive(Object, Debug)]
pub struct UpdateProfileRequest {
    /// Empty string clears the department
    pub department: Option<String>,
    /// Empty string clears the phone number
    pub phone_number: Option<String>,
    pub dark_mode: Option<bool>,
}

#[derive(Object, Debug)]
pub struct DarkModeResponse {
    pub dark_mode: bool,
}

#[derive(Object, Debug)]
pub struct NotificationResponse {
    pub id: i64,
    /// Public ID of the ticket the notification is about
    pub ticket_id: Option<String>,
    pub notification_type: String,
    pub sent_at: i64,
    pub is_read: bool,
}

impl NotificationResponse {
    pub fn new(notification: &ticket_notification::Model, ticket: Option<&ticket::Model>) -> Self {
        Self {
            id: notification.id,
            ticket_id: ticket.map(|t| t.ticket_id.clone()),
            notification_type: notification.notification_type.clone(),
            sent_at: notification.sent_at,
            is_read: notification.is_read,
        }
    }
}

use crate::types::db::{profile, user};

/// The identity an operation runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: String,
    pub is_staff: bool,
}

impl Viewer {
    pub fn new(user_id: &str, is_staff: bool) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_staff,
        }
    }

    pub fn from_models(user: &user::Model, profile: &profile::Model) -> Self {
        Self::new(&user.id, profile.is_it_staff)
    }
}

/// Self-service registration input
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub department: Option<String>,
    pub phone_number: Option<String>,
}

/// Profile fields to change; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub department: Option<String>,
    pub phone_number: Option<String>,
    pub dark_mode: Option<bool>,
}

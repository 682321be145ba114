//! DTOs for the users_sea adapter.

#[derive(Debug, Clone)]
pub struct UserCreate {
    pub sub: String,
    pub display_name: String,
}

impl UserCreate {
    pub fn new(sub: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialsCreate {
    pub user_id: i64,
    pub email: String,
    pub provider_sub: Option<String>,
}

impl CredentialsCreate {
    pub fn new(user_id: i64, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            provider_sub: None,
        }
    }

    pub fn with_provider_sub(mut self, provider_sub: impl Into<String>) -> Self {
        self.provider_sub = Some(provider_sub.into());
        self
    }
}

/// Profile changes. Outer `None` keeps the column; `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub city_label: Option<Option<String>>,
}

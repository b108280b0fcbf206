use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Employee,
    Admin,
}

/// The record kept under the `user` key of the session storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "type")]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
impl User {
    pub fn employee(email: &str) -> Self {
        Self {
            user_type: UserType::Employee,
            email: Some(email.to_string()),
        }
    }
}

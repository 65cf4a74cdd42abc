use serde::{Deserialize, Serialize};

use super::{Resource, Validate, require_text};
use crate::Result;

/// A marketplace user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Validate for UserInput {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("email", &self.email)
    }
}

impl Resource for User {
    type Input = UserInput;
    const PATH: &'static str = "users";
    const NAME: &'static str = "user";
}

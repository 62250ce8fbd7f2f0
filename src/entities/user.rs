use crate::core::validation::{FieldRule, ValidatedPayload, ValidationSchema, filters, validators};
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A registered account
///
/// `password` holds the argon2 hash and never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(User, "user", "users", search = "name", hidden = ["password"]);

fn default_roles() -> Vec<Role> {
    vec![Role::User]
}

impl User {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            password: password_hash.into(),
            roles: if roles.is_empty() { default_roles() } else { roles },
            created_at: now,
            updated_at: now,
        }
    }
}

const ROLE_MESSAGE: &str = "Roles must be either \"user\" or \"admin\"";

/// Body of `POST /auth/signup`
#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roles: Option<Vec<Role>>,
}

impl ValidatedPayload for SignUp {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(name_rule(FieldRule::required("name", "Name is required.")))
            .field(email_rule(FieldRule::required("email", "Email is required.")))
            .field(password_rule(
                FieldRule::required("password", "Password is required."),
                "Password must be at least 6 characters long.",
            ))
            .field(roles_rule(FieldRule::optional("roles")))
    }
}

/// Body of `POST /auth/signin`
#[derive(Debug, Clone, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

impl ValidatedPayload for SignIn {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(email_rule(FieldRule::required("email", "Email is required.")))
            .field(password_rule(
                FieldRule::required("password", "Password is required."),
                "Password must be at least 6 characters long.",
            ))
    }
}

/// Body of `PUT /users/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Vec<Role>>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.roles.is_none()
    }
}

impl ValidatedPayload for UpdateUser {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(name_rule(FieldRule::optional("name")))
            .field(email_rule(FieldRule::optional("email")))
            .field(password_rule(
                FieldRule::optional("password"),
                "Password must be at least 6 characters long.",
            ))
            .field(roles_rule(FieldRule::optional("roles")))
    }
}

/// Body of `PATCH /users/{id}/password`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

impl ValidatedPayload for ChangePassword {
    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field(password_rule(
                FieldRule::required("currentPassword", "Current password is required."),
                "Current password must be at least 6 characters long.",
            ))
            .field(password_rule(
                FieldRule::required("newPassword", "New password is required."),
                "New password must be at least 6 characters long.",
            ))
    }
}

fn name_rule(rule: FieldRule) -> FieldRule {
    rule.filter(filters::trim())
        .validate(validators::string())
        .validate(validators::non_empty("Name cannot be empty."))
}

fn email_rule(rule: FieldRule) -> FieldRule {
    rule.filter(filters::trim())
        .filter(filters::lowercase())
        .validate(validators::string())
        .validate(validators::email("Email must be a valid email address."))
}

fn password_rule(rule: FieldRule, too_short: &str) -> FieldRule {
    rule.validate(validators::string())
        .validate(validators::min_length(6, too_short))
}

fn roles_rule(rule: FieldRule) -> FieldRule {
    rule.validate(validators::array())
        .validate(validators::array_min(1, "Roles must not be empty"))
        .validate(validators::in_list(&["user", "admin"], ROLE_MESSAGE))
}

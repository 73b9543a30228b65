//! Mock authentication.
//!
//! Two hardcoded accounts; the logged-in user is stored under
//! [`USER_KEY`](crate::storage::USER_KEY) and never expires.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{SimError, SimResult};
use crate::storage::{KeyValueStore, USER_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub role: Role,
}

struct Account {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
}

const ACCOUNTS: [Account; 2] = [
    Account {
        email: "admin@simlab.com",
        password: "admin123",
        name: "Administrador",
        role: Role::Admin,
    },
    Account {
        email: "instrutor@simlab.com",
        password: "instrutor123",
        name: "Instrutor",
        role: Role::Instructor,
    },
];

/// Check credentials against the built-in accounts and store the user.
pub fn login<S: KeyValueStore>(storage: &mut S, email: &str, password: &str) -> SimResult<User> {
    let account = ACCOUNTS.iter().find(|a| a.email == email && a.password == password);

    let Some(account) = account else {
        warn!(email, "login rejected");
        return Err(SimError::InvalidCredentials {
            email: email.to_string(),
        });
    };

    let user = User {
        email: account.email.to_string(),
        name: account.name.to_string(),
        role: account.role,
    };
    storage.set_json(USER_KEY, &user)?;
    info!(email = %user.email, "logged in");
    Ok(user)
}

pub fn current_user<S: KeyValueStore>(storage: &S) -> SimResult<Option<User>> {
    storage.get_json(USER_KEY)
}

/// Returns whether a user was logged in
pub fn logout<S: KeyValueStore>(storage: &mut S) -> SimResult<bool> {
    storage.remove(USER_KEY)
}

//! Login sessions as explicit values.
//!
//! RULE: there is no ambient "current user". `Directory::login` hands out
//! a `Session`, and every operation that needs a role check receives that
//! session as an argument.

use crate::{
    error::{PortalError, PortalResult},
    types::{BranchId, EmployeeId, UserId},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Employee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Employee => write!(f, "employee"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "customer" => Ok(Role::Customer),
            "employee" => Ok(Role::Employee),
            other => Err(anyhow::anyhow!("Unknown role '{other}' (expected customer or employee)")),
        }
    }
}

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Customer { user_id: UserId },
    Employee { employee_id: EmployeeId, branch_id: Option<BranchId> },
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Customer { .. } => Role::Customer,
            Principal::Employee { .. } => Role::Employee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub role:     Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token:     Uuid,
    pub name:      String,
    pub principal: Principal,
}

impl Session {
    pub fn role(&self) -> Role {
        self.principal.role()
    }

    pub fn require_role(&self, required: Role) -> PortalResult<()> {
        if self.role() == required {
            Ok(())
        } else {
            log::warn!("session {} ({}) denied: requires {required}", self.token, self.role());
            Err(PortalError::Forbidden { required })
        }
    }

    /// The customer's own user id, or `Forbidden` for employees.
    pub fn customer_id(&self) -> PortalResult<UserId> {
        match self.principal {
            Principal::Customer { user_id } => Ok(user_id),
            Principal::Employee { .. } => Err(PortalError::Forbidden { required: Role::Customer }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub username:  String,
    pub password:  String,
    pub name:      String,
    pub principal: Principal,
}

/// The set of accounts that may log in to the portal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    pub entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// The demo logins: three customers and three employees.
    pub fn demo() -> Self {
        let customer = |username: &str, name: &str, user_id| DirectoryEntry {
            username:  username.into(),
            password:  "password".into(),
            name:      name.into(),
            principal: Principal::Customer { user_id },
        };
        let employee = |username: &str, name: &str, employee_id, branch_id| DirectoryEntry {
            username:  username.into(),
            password:  "password".into(),
            name:      name.into(),
            principal: Principal::Employee { employee_id, branch_id: Some(branch_id) },
        };
        Self {
            entries: vec![
                customer("amit", "Amit Sharma", 1),
                customer("priya", "Priya Singh", 2),
                customer("rahul", "Rahul Verma", 3),
                employee("rajesh", "Rajesh Sharma", 1, 1),
                employee("priya_e", "Priya Singh", 2, 1),
                employee("amit_e", "Amit Kumar", 3, 2),
            ],
        }
    }

    pub fn login(&self, creds: &Credentials) -> PortalResult<Session> {
        let entry = self
            .entries
            .iter()
            .find(|e| {
                e.username == creds.username
                    && e.password == creds.password
                    && e.principal.role() == creds.role
            })
            .ok_or_else(|| {
                log::info!("login rejected for {} as {}", creds.username, creds.role);
                PortalError::InvalidCredentials
            })?;

        let session = Session {
            token:     Uuid::new_v4(),
            name:      entry.name.clone(),
            principal: entry.principal.clone(),
        };
        log::info!("login: {} as {} (session {})", creds.username, creds.role, session.token);
        Ok(session)
    }

    /// End a session. Consuming it means the value cannot be reused.
    pub fn logout(&self, session: Session) {
        log::info!("logout: {} (session {})", session.name, session.token);
    }
}

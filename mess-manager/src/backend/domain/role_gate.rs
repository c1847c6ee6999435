//! Session role and the manager-only gate every mutation goes through.
//!
//! The role lives only in memory: a restart always starts as [`Role::Viewer`].

use log::{info, warn};
use shared::Role;
use std::sync::{Arc, RwLock};

/// Outcome of a gated action
#[derive(Debug, Clone, PartialEq)]
pub enum Gated<T> {
    /// The session was a manager and the action ran
    Applied(T),
    /// The session was not a manager; nothing was written
    Rejected,
}

impl<T> Gated<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Gated::Applied(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Gated::Rejected)
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Gated::Applied(value) => Some(value),
            Gated::Rejected => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Gated<U> {
        match self {
            Gated::Applied(value) => Gated::Applied(f(value)),
            Gated::Rejected => Gated::Rejected,
        }
    }
}

/// Shared handle to the session role; clones see the same state
#[derive(Clone, Default)]
pub struct RoleGate {
    role: Arc<RwLock<Role>>,
}

impl RoleGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Role {
        *self.role.read().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_manager(&self) -> bool {
        self.role() == Role::Manager
    }

    pub(crate) fn set_role(&self, role: Role) {
        let mut current = self.role.write().unwrap_or_else(|p| p.into_inner());
        if *current != role {
            info!("Session role changed: {:?} -> {:?}", *current, role);
            *current = role;
        }
    }

    /// `true` when `action` may proceed; logs and returns `false` otherwise
    pub fn permits(&self, action: &str) -> bool {
        if self.is_manager() {
            true
        } else {
            warn!("Rejected '{}': manager role required", action);
            false
        }
    }
}

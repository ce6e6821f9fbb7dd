//! Authorization gates.
//!
//! A [`GateChain`] is built once per route and checked against the request's
//! [`Identity`] before the handler runs. Chains only come in the fixed
//! orders below, so a permission lookup can never happen for an inactive or
//! anonymous caller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::services::PermissionService;
use crate::domain::entities::Identity;
use crate::domain::repositories::PermissionRepository;
use crate::error::AppError;

/// A single authorization check.
#[async_trait]
pub trait Gate: Send + Sync {
    async fn check(&self, identity: &Identity) -> Result<(), AppError>;
}

/// Rejects anonymous callers.
pub struct RequireAuthenticated;

#[async_trait]
impl Gate for RequireAuthenticated {
    async fn check(&self, identity: &Identity) -> Result<(), AppError> {
        if identity.is_anonymous() {
            return Err(AppError::AuthenticationRequired);
        }
        Ok(())
    }
}

/// Rejects users whose account is not activated.
pub struct RequireActivated;

#[async_trait]
impl Gate for RequireActivated {
    async fn check(&self, identity: &Identity) -> Result<(), AppError> {
        if !identity.is_activated() {
            return Err(AppError::AccountInactive);
        }
        Ok(())
    }
}

/// Rejects users lacking a permission code.
pub struct RequirePermission {
    code: &'static str,
    permissions: Arc<PermissionService<dyn PermissionRepository>>,
}

#[async_trait]
impl Gate for RequirePermission {
    async fn check(&self, identity: &Identity) -> Result<(), AppError> {
        self.permissions
            .require(identity.user_id(), self.code)
            .await
    }
}

/// Ordered gates, evaluated first to last; the first failure wins.
#[derive(Clone)]
pub struct GateChain {
    gates: Vec<Arc<dyn Gate>>,
}

impl GateChain {
    /// Authenticated callers only.
    pub fn authenticated() -> Self {
        Self {
            gates: vec![Arc::new(RequireAuthenticated)],
        }
    }

    /// Authenticated and activated callers.
    pub fn activated() -> Self {
        let mut chain = Self::authenticated();
        chain.gates.push(Arc::new(RequireActivated));
        chain
    }

    /// Authenticated, activated, and holding `code`.
    pub fn permission(
        code: &'static str,
        permissions: Arc<PermissionService<dyn PermissionRepository>>,
    ) -> Self {
        let mut chain = Self::activated();
        chain
            .gates
            .push(Arc::new(RequirePermission { code, permissions }));
        chain
    }

    pub async fn check(&self, identity: &Identity) -> Result<(), AppError> {
        for gate in &self.gates {
            gate.check(identity).await?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

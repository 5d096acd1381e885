//! Access
//!
//! Role, plan and permission gating for protected views and actions.
//!
//! [`evaluate`] checks a [`Requirement`] against the signed-in [`UserIdentity`] in a fixed order
//! (authentication, role, plan, permission) and reports the first unmet requirement.

use std::{fmt, str::FromStr};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

pub mod features;
pub mod routes;

pub use features::Feature;

/// Errors parsing access identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    /// Unrecognised role name
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Unrecognised plan name
    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    /// Unrecognised feature name
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Branch supervisor
    Supervisor,
    /// Salesperson
    Vendedor,
    /// Accountant
    Contador,
    /// Stock keeper
    Inventario,
}

impl Role {
    /// Every role.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Supervisor,
        Role::Vendedor,
        Role::Contador,
        Role::Inventario,
    ];

    /// Wire name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Vendedor => "vendedor",
            Role::Contador => "contador",
            Role::Inventario => "inventario",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AccessError::UnknownRole(s.to_string()))
    }
}

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Entry tier
    Emprendedor,
    /// Retail tier
    Comercios,
    /// Small and medium business tier
    Pymes,
}

impl Plan {
    /// Every plan, from the entry tier upwards.
    pub const ALL: [Plan; 3] = [Plan::Emprendedor, Plan::Comercios, Plan::Pymes];

    /// Wire name of the plan.
    pub const fn as_str(self) -> &'static str {
        match self {
            Plan::Emprendedor => "emprendedor",
            Plan::Comercios => "comercios",
            Plan::Pymes => "pymes",
        }
    }

    /// Features included in the plan.
    pub fn features(self) -> &'static [Feature] {
        features::plan_features(self)
    }

    /// Whether the plan includes `feature`.
    pub fn includes(self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::ALL
            .into_iter()
            .find(|plan| plan.as_str() == s)
            .ok_or_else(|| AccessError::UnknownPlan(s.to_string()))
    }
}

/// The signed-in user as read from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User identity
    pub id: String,

    /// Display name
    #[serde(default)]
    pub full_name: String,

    /// Role
    pub role: Role,

    /// Subscription plan
    pub plan: Plan,

    /// Granted permission strings
    #[serde(default)]
    pub permissions: FxHashSet<String>,
}

impl UserIdentity {
    /// Create a user with no permissions.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role, plan: Plan) -> Self {
        Self {
            id: id.into(),
            full_name: String::new(),
            role,
            plan,
            permissions: FxHashSet::default(),
        }
    }

    /// Grant `permission`.
    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Whether `permission` has been granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Required roles
pub type Roles = SmallVec<[Role; 5]>;

/// Required plans
pub type Plans = SmallVec<[Plan; 3]>;

/// Required permissions
pub type Permissions = SmallVec<[String; 2]>;

/// Requirements a user must meet. Empty sets are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    roles: Roles,
    plans: Plans,
    permissions: Permissions,
}

impl Requirement {
    /// Only require a signed-in user.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Require a plan that includes `feature`.
    #[must_use]
    pub fn feature(feature: Feature) -> Self {
        Self::default().with_plans(features::plans_including(feature))
    }

    /// Require one of `roles`.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        for role in roles {
            if !self.roles.contains(&role) {
                self.roles.push(role);
            }
        }

        self
    }

    /// Require one of `plans`.
    #[must_use]
    pub fn with_plans(mut self, plans: impl IntoIterator<Item = Plan>) -> Self {
        for plan in plans {
            if !self.plans.contains(&plan) {
                self.plans.push(plan);
            }
        }

        self
    }

    /// Require at least one of `permissions`.
    #[must_use]
    pub fn with_permissions<S: Into<String>>(
        mut self,
        permissions: impl IntoIterator<Item = S>,
    ) -> Self {
        for permission in permissions {
            let permission = permission.into();

            if !self.permissions.contains(&permission) {
                self.permissions.push(permission);
            }
        }

        self
    }

    /// Required roles
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Required plans
    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Required permissions
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }
}

/// Which requirement was unmet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    /// No signed-in user
    Unauthenticated,
    /// Role not in the required set
    Role,
    /// Plan not in the required set
    Plan,
    /// None of the required permissions granted
    Permission,
}

/// Access was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// No signed-in user.
    #[error("not signed in")]
    Unauthenticated,

    /// The user's role is not one of the required roles.
    #[error("role {actual} is not one of: {}", join(.required))]
    RoleMismatch {
        /// Required roles
        required: Roles,
        /// The user's role
        actual: Role,
    },

    /// The user's plan is not one of the required plans.
    #[error("plan {actual} is not one of: {}", join(.required))]
    PlanMismatch {
        /// Required plans
        required: Plans,
        /// The user's plan
        actual: Plan,
    },

    /// None of the required permissions have been granted.
    #[error("none of the permissions granted: {}", join(.required))]
    PermissionMismatch {
        /// Required permissions
        required: Permissions,
    },
}

impl Denial {
    /// The unmet requirement.
    pub fn reason(&self) -> DenialReason {
        match self {
            Denial::Unauthenticated => DenialReason::Unauthenticated,
            Denial::RoleMismatch { .. } => DenialReason::Role,
            Denial::PlanMismatch { .. } => DenialReason::Plan,
            Denial::PermissionMismatch { .. } => DenialReason::Permission,
        }
    }

    /// User-facing message for the denial.
    pub fn notice(&self) -> Notice {
        match self {
            Denial::Unauthenticated => Notice {
                title: "Sign in required",
                description: "You need to sign in to access this section.".to_string(),
                details: String::new(),
                action: SuggestedAction::SignIn,
            },
            Denial::RoleMismatch { required, actual } => Notice {
                title: "Access restricted by role",
                description: format!(
                    "Your current role ({actual}) does not have access to this section."
                ),
                details: format!("Required roles: {}", join(required)),
                action: SuggestedAction::Contact,
            },
            Denial::PlanMismatch { required, actual } => Notice {
                title: "Not available on your plan",
                description: format!("Your current plan ({actual}) does not include this feature."),
                details: format!("Required plans: {}", join(required)),
                action: SuggestedAction::Upgrade,
            },
            Denial::PermissionMismatch { required } => Notice {
                title: "Insufficient permissions",
                description: "You do not have the permissions needed for this feature."
                    .to_string(),
                details: format!("Required permissions: {}", join(required)),
                action: SuggestedAction::Contact,
            },
        }
    }
}

/// What the user can do about a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedAction {
    /// Go to the sign-in page
    SignIn,
    /// Ask an administrator
    Contact,
    /// Upgrade the subscription plan
    Upgrade,
}

/// Message rendered for a denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Heading
    pub title: &'static str,
    /// Explanation referencing the user's current role or plan
    pub description: String,
    /// The requirement that was not met
    pub details: String,
    /// Suggested follow-up
    pub action: SuggestedAction,
}

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// All requirements met
    Allowed,
    /// The first unmet requirement
    Denied(Denial),
}

impl Access {
    /// Whether access was granted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// The denial, if access was refused.
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Access::Allowed => None,
            Access::Denied(denial) => Some(denial),
        }
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the [`Denial`] if access was refused.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied(denial) => Err(denial),
        }
    }
}

/// Decide whether `user` meets `requirement`.
pub fn evaluate(user: Option<&UserIdentity>, requirement: &Requirement) -> Access {
    let Some(user) = user else {
        return Access::Denied(Denial::Unauthenticated);
    };

    if !requirement.roles.is_empty() && !requirement.roles.contains(&user.role) {
        return Access::Denied(Denial::RoleMismatch {
            required: requirement.roles.clone(),
            actual: user.role,
        });
    }

    if !requirement.plans.is_empty() && !requirement.plans.contains(&user.plan) {
        return Access::Denied(Denial::PlanMismatch {
            required: requirement.plans.clone(),
            actual: user.plan,
        });
    }

    if !requirement.permissions.is_empty()
        && !requirement
            .permissions
            .iter()
            .any(|permission| user.has_permission(permission))
    {
        return Access::Denied(Denial::PermissionMismatch {
            required: requirement.permissions.clone(),
        });
    }

    Access::Allowed
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

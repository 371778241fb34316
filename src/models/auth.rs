//! Identity carried through every core operation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// Claims of the bearer token issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String, // user_id
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

/// Who is performing the current request.
///
/// Built once at the HTTP edge and passed explicitly into services; the
/// core never looks at ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl ActorContext {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    pub fn customer(user_id: Uuid) -> Self {
        Self::new(user_id, UserRole::Customer)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Originator of a lifecycle transition. Date-driven completion is
/// performed by the system rather than a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    User(ActorContext),
    System,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::User(ctx) if ctx.is_admin())
    }

    pub fn is_owner_of(&self, user_id: Uuid) -> bool {
        matches!(self, Actor::User(ctx) if ctx.user_id == user_id)
    }
}

impl From<ActorContext> for Actor {
    fn from(ctx: ActorContext) -> Self {
        Actor::User(ctx)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::User(ctx) => write!(f, "{}:{}", ctx.role.as_str(), ctx.user_id),
            Actor::System => f.write_str("system"),
        }
    }
}

//! Actor extraction. Session issuance and verification live in an upstream
//! auth layer; by the time a request reaches this service the gateway has
//! resolved the session into identity headers, which we trust.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const FAMILY_ID_HEADER: &str = "x-family-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Parent,
    Child,
}

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub family_id: Uuid,
}

fn header_value(parts: &Parts, name: &str) -> Result<String, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .ok_or(AppError::Unauthorized)
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, ACTOR_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized)?;

        let role = match header_value(parts, ACTOR_ROLE_HEADER)?.as_str() {
            "parent" => Role::Parent,
            "child" => Role::Child,
            _ => return Err(AppError::Unauthorized),
        };

        let family_id = header_value(parts, FAMILY_ID_HEADER)?
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(Actor {
            id,
            role,
            family_id,
        })
    }
}

/// A request authenticated as a child account.
#[derive(Debug, Clone, Copy)]
pub struct Child(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for Child
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;
        if actor.role != Role::Child {
            return Err(AppError::Unauthorized);
        }
        Ok(Child(actor))
    }
}

/// A request authenticated as a parent.
#[derive(Debug, Clone, Copy)]
pub struct Parent(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for Parent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;
        if actor.role != Role::Parent {
            return Err(AppError::Unauthorized);
        }
        Ok(Parent(actor))
    }
}

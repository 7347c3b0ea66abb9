//! Custom Axum extractors.

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use bingo_session::TicketId;

/// Ticket id taken from the `:id` path segment.
///
/// Anything that is not a ticket number is answered like an unknown ticket:
/// 404 with a JSON `{error, code}` body.
///
/// ```ignore
/// async fn handler(TicketPath(id): TicketPath) -> String {
///     id.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketPath(pub TicketId);

#[async_trait]
impl<S> FromRequestParts<S> for TicketPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        match raw.parse::<u32>() {
            Ok(number) => Ok(Self(TicketId::from(number))),
            Err(_) => Err(AppError::not_found("Ticket", raw)),
        }
    }
}

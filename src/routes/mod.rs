/// Router Module Index
///
/// Routes are split by the access they require. Authentication is applied per module
/// (via Axum layers) so a protected endpoint cannot be exposed by accident; the
/// fine-grained permission check happens inside each handler.

/// Anonymous, read-only routes: published content, contact details and login.
pub mod public;

/// Routes that need a validated session: account management, role/permission
/// administration and every content write.
pub mod authenticated;

/// Back-office listings under `/api/admin` that include unpublished drafts.
pub mod admin;

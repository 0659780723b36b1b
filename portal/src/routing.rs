// portal/src/routing.rs
use std::sync::Arc;

use crate::api::PortalApi;

/// Post-login navigation targets. The rendering layer owns the actual
/// routes; this core only decides where a principal lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Login,
    AdminConsole,
    StudentDetail(i64),
    StudentSelection,
}

/// Navigation intent deferred while the forced password change is open.
/// Kept as data rather than a stored callback so flow state stays
/// inspectable and serializable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDestination {
    Admin,
    Student { email: String },
}

/// Decide the landing screen for a student principal.
///
/// Identity-to-record binding is best effort: a case-insensitive exact
/// email match routes straight to that student's detail screen, anything
/// else falls back to manual selection. A failed roster fetch is demoted
/// to a warning; the authoritative gate is the token's role claim, so the
/// user just disambiguates by hand.
pub async fn resolve_student_landing(api: &Arc<dyn PortalApi>, email: &str) -> Destination {
    match api.fetch_students().await {
        Ok(students) => match students.iter().find(|student| student.matches_email(email)) {
            Some(student) => {
                tracing::debug!("Matched {} to student record {}", email, student.id);
                Destination::StudentDetail(student.id)
            }
            None => Destination::StudentSelection,
        },
        Err(e) => {
            tracing::warn!("Unable to auto-select student dashboard, falling back: {}", e);
            Destination::StudentSelection
        }
    }
}

/// Resume a deferred navigation intent
pub async fn resolve_pending(api: &Arc<dyn PortalApi>, pending: &PendingDestination) -> Destination {
    match pending {
        PendingDestination::Admin => Destination::AdminConsole,
        PendingDestination::Student { email } => resolve_student_landing(api, email).await,
    }
}

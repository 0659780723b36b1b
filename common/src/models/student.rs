// common/src/models/student.rs
use serde::{Deserialize, Serialize};

/// A roster entry as served by the backend. Read-only to this core; it is
/// consulted only to bind a signed-in principal to a student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub academic_year: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive exact match on the roster email
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_match_ignores_case() {
        let student: Student = serde_json::from_str(
            r#"{"id":7,"email":"Aditi.Sharma@Example.com","firstName":"Aditi","lastName":"Sharma"}"#,
        )
        .expect("roster entry deserializes");
        assert!(student.matches_email("aditi.sharma@example.com"));
        assert!(!student.matches_email("rahul.desai@example.com"));
        assert_eq!(student.full_name(), "Aditi Sharma");
        assert_eq!(student.course, "");
    }
}

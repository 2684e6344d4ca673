//! Participant records as stored in the registration database
//!
//! Registration documents look like:
//!
//! ```json
//! {
//!   "_id": ObjectId("5c4a..."),
//!   "email": "ada@example.edu",
//!   "profile": { "name": "Ada", "school": "Auburn University", "graduationYear": "2021" },
//!   "confirmation": { "github": "ada", "twitter": "ada_l", "major": "CS" }
//! }
//! ```

use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{Deserialize, Deserializer};

use super::SyncError;

/// A normalized participant record for one sync cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRecord {
    /// Hex form of the registration document `_id`
    pub id: String,
    pub name: String,
    pub email: String,
    pub school: String,
    /// Graduation year exactly as entered at registration
    pub grad_year: String,
    pub github: String,
    /// Social handle from the confirmation form (the `twitter` field)
    pub linkedin: String,
    pub major: String,
    /// Filled in by the resume augmenter
    pub resume_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, deserialize_with = "nullable_string")]
    email: String,
    #[serde(default, deserialize_with = "nullable")]
    profile: ProfileFields,
    #[serde(default, deserialize_with = "nullable")]
    confirmation: ConfirmationFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileFields {
    #[serde(deserialize_with = "nullable_string")]
    name: String,
    #[serde(deserialize_with = "nullable_string")]
    school: String,
    #[serde(rename = "graduationYear", deserialize_with = "nullable_string")]
    graduation_year: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfirmationFields {
    #[serde(deserialize_with = "nullable_string")]
    github: String,
    #[serde(deserialize_with = "nullable_string")]
    twitter: String,
    #[serde(deserialize_with = "nullable_string")]
    major: String,
}

/// Registration forms store unanswered questions as `null`
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExternalRecord {
    /// Decode one registration document.
    ///
    /// Missing or null fields become empty strings. A missing or non-ObjectId
    /// `_id`, or a field of the wrong type, is a `Decode` error.
    pub fn from_document(document: Document) -> Result<Self, SyncError> {
        let context = document_context(&document);
        let user: UserDocument =
            bson::from_document(document).map_err(|e| SyncError::Decode {
                context,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id: user.id.to_hex(),
            name: user.profile.name,
            email: user.email,
            school: user.profile.school,
            grad_year: user.profile.graduation_year,
            github: user.confirmation.github,
            linkedin: user.confirmation.twitter,
            major: user.confirmation.major,
            resume_url: None,
        })
    }

    pub fn has_resume(&self) -> bool {
        self.resume_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Short description of a document for error messages
fn document_context(document: &Document) -> String {
    match document.get("_id") {
        Some(id) => format!("_id={}", id),
        None => {
            let raw = document.to_string();
            if raw.len() > 120 {
                let cut = (0..=120).rev().find(|&i| raw.is_char_boundary(i)).unwrap_or(0);
                format!("{}...", &raw[..cut])
            } else {
                raw
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, Bson};

    #[test]
    fn test_decode_full_document() {
        let id = ObjectId::new();
        let record = ExternalRecord::from_document(doc! {
            "_id": id,
            "email": "ada@example.edu",
            "profile": { "name": "Ada", "school": "Auburn University", "graduationYear": "2021" },
            "confirmation": { "github": "ada", "twitter": "ada_l", "major": "Computer Science" },
        })
        .unwrap();

        assert_eq!(record.id, id.to_hex());
        assert_eq!(record.name, "Ada");
        assert_eq!(record.email, "ada@example.edu");
        assert_eq!(record.school, "Auburn University");
        assert_eq!(record.grad_year, "2021");
        assert_eq!(record.github, "ada");
        assert_eq!(record.linkedin, "ada_l");
        assert_eq!(record.major, "Computer Science");
        assert_eq!(record.resume_url, None);
    }

    #[test]
    fn test_missing_and_null_fields_default_to_empty() {
        let record = ExternalRecord::from_document(doc! {
            "_id": ObjectId::new(),
            "profile": { "name": "Grace", "school": Bson::Null },
            "confirmation": Bson::Null,
        })
        .unwrap();

        assert_eq!(record.name, "Grace");
        assert_eq!(record.school, "");
        assert_eq!(record.grad_year, "");
        assert_eq!(record.email, "");
        assert_eq!(record.github, "");
    }

    #[test]
    fn test_wrong_field_type_is_decode_error() {
        let id = ObjectId::new();
        let err = ExternalRecord::from_document(doc! {
            "_id": id,
            "profile": { "name": "Linus", "graduationYear": 2022 },
        })
        .unwrap_err();

        match err {
            SyncError::Decode { context, .. } => assert!(context.contains(&id.to_hex())),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_id_is_decode_error() {
        let err = ExternalRecord::from_document(doc! { "_id": "not-an-object-id" }).unwrap_err();
        assert!(matches!(err, SyncError::Decode { .. }));
    }

    #[test]
    fn test_missing_id_reports_document_body() {
        let err = ExternalRecord::from_document(doc! { "email": "nobody@example.edu" }).unwrap_err();
        match err {
            SyncError::Decode { context, .. } => assert!(context.contains("nobody@example.edu")),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_has_resume() {
        let mut record = ExternalRecord::from_document(doc! { "_id": ObjectId::new() }).unwrap();
        assert!(!record.has_resume());
        record.resume_url = Some(String::new());
        assert!(!record.has_resume());
        record.resume_url = Some("https://storage.example.com/r.pdf".to_string());
        assert!(record.has_resume());
    }
}

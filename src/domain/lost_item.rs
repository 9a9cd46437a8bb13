use chrono::NaiveDateTime;

use crate::domain::types::{ContactNumber, LostItemId, LostStatus, ValidationError, non_empty};

/// A report filed by someone looking for their belongings.
#[derive(Debug, Clone)]
pub struct LostItem {
    pub id: LostItemId,
    pub description: String,
    pub contact: ContactNumber,
    pub email: String,
    pub status: LostStatus,
    pub embedding: Option<Vec<f32>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewLostItem {
    pub description: String,
    pub contact: ContactNumber,
    pub email: String,
}

impl NewLostItem {
    /// Validates a lost item report. The email address is only checked for
    /// presence; delivery failures surface when the notification is sent.
    pub fn new(description: &str, contact: &str, email: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            description: non_empty(description, "description")?,
            contact: ContactNumber::parse(contact)?,
            email: non_empty(email, "email")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lost_item_requires_description_and_email() {
        assert_eq!(
            NewLostItem::new("", "9000000000", "a@b.c").unwrap_err(),
            ValidationError::EmptyField("description")
        );
        assert_eq!(
            NewLostItem::new("black wallet", "9000000000", " ").unwrap_err(),
            ValidationError::EmptyField("email")
        );
    }

    #[test]
    fn new_lost_item_rejects_contact_with_letters() {
        assert!(matches!(
            NewLostItem::new("black wallet", "90000O0000", "a@b.c"),
            Err(ValidationError::InvalidContact(_))
        ));
    }
}

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::domain::types::{ContactNumber, FoundItemId, ValidationError, non_empty};

/// An item someone handed in, described by a caption of its photo.
#[derive(Debug, Clone)]
pub struct FoundItem {
    pub id: FoundItemId,
    pub caption: String,
    pub location: String,
    pub contact: ContactNumber,
    /// Current location of the stored photo; moves to the archive once matched.
    pub image_path: PathBuf,
    pub matched: bool,
    pub embedding: Option<Vec<f32>>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewFoundItem {
    pub caption: String,
    pub location: String,
    pub contact: ContactNumber,
    pub image_path: PathBuf,
}

impl NewFoundItem {
    /// Validates a found item submission. Caption and location are trimmed.
    pub fn new(
        caption: &str,
        location: &str,
        contact: &str,
        image_path: impl Into<PathBuf>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            caption: non_empty(caption, "caption")?,
            location: non_empty(location, "location")?,
            contact: ContactNumber::parse(contact)?,
            image_path: image_path.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_found_item_trims_text_fields() {
        let item = NewFoundItem::new("  red backpack ", "Library\n", "9000000000", "a.png")
            .expect("valid item");

        assert_eq!(item.caption, "red backpack");
        assert_eq!(item.location, "Library");
    }

    #[test]
    fn new_found_item_rejects_blank_caption_and_bad_contact() {
        assert_eq!(
            NewFoundItem::new("   ", "Library", "9000000000", "a.png").unwrap_err(),
            ValidationError::EmptyField("caption")
        );
        assert!(matches!(
            NewFoundItem::new("umbrella", "Library", "90000", "a.png"),
            Err(ValidationError::InvalidContact(_))
        ));
    }
}

//! Shape checks applied to reviews coming from and going to a backend.

use super::models::{NewReview, Review, ReviewRecord};
use crate::{Error, Result};

const MAX_NAME_LEN: usize = 120;
const MAX_COMMENT_LEN: usize = 4000;

/// Turn a raw backend row into a feed review, or explain why it is malformed
pub fn validate_record(record: ReviewRecord) -> Result<Review> {
    let malformed = |reason: &str| Error::MalformedReview {
        id: record.id,
        reason: reason.to_string(),
    };

    if record.id <= 0 {
        return Err(malformed("missing id"));
    }
    if record.client_name.trim().is_empty() {
        return Err(malformed("missing client name"));
    }
    if !(1..=5).contains(&record.rating) {
        return Err(malformed(&format!("rating {} outside 1..=5", record.rating)));
    }
    if !record.is_approved {
        return Err(malformed("review is not approved"));
    }
    let created_at = record
        .created_at
        .ok_or_else(|| malformed("missing created_at"))?;

    Ok(Review {
        id: record.id,
        name: record.client_name,
        rating: record.rating as u8,
        comment: record.comment,
        created_at,
        approved: true,
    })
}

/// Normalize and check a guest submission before it reaches a backend
pub fn validate_new_review(review: &NewReview) -> Result<NewReview> {
    let name = review.name.trim();
    let comment = review.comment.trim();

    if name.is_empty() {
        return Err(Error::InvalidReview("name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::InvalidReview(format!(
            "name is longer than {} characters",
            MAX_NAME_LEN
        )));
    }
    if !(1..=5).contains(&review.rating) {
        return Err(Error::InvalidReview("rating must be between 1 and 5".into()));
    }
    if comment.is_empty() {
        return Err(Error::InvalidReview("comment is required".into()));
    }
    if comment.chars().count() > MAX_COMMENT_LEN {
        return Err(Error::InvalidReview(format!(
            "comment is longer than {} characters",
            MAX_COMMENT_LEN
        )));
    }

    Ok(NewReview {
        name: name.to_string(),
        rating: review.rating,
        comment: comment.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: i64) -> ReviewRecord {
        ReviewRecord {
            id,
            client_name: "Joana".into(),
            rating: 4,
            comment: "Great view".into(),
            created_at: Some(Utc::now()),
            is_approved: true,
        }
    }

    #[test]
    fn test_valid_record_passes() {
        let review = validate_record(record(1)).unwrap();
        assert_eq!(review.id, 1);
        assert_eq!(review.rating, 4);
        assert!(review.approved);
    }

    #[test]
    fn test_rating_out_of_range_is_malformed() {
        let mut bad = record(2);
        bad.rating = 9;
        assert!(matches!(
            validate_record(bad),
            Err(Error::MalformedReview { id: 2, .. })
        ));
    }

    #[test]
    fn test_blank_name_and_missing_date_are_malformed() {
        let mut blank = record(3);
        blank.client_name = "   ".into();
        assert!(validate_record(blank).is_err());

        let mut undated = record(4);
        undated.created_at = None;
        assert!(validate_record(undated).is_err());
    }

    #[test]
    fn test_record_decoded_from_nulls_is_malformed() {
        let row = serde_json::json!({"id": 6, "client_name": null, "rating": null, "comment": null});
        assert!(matches!(
            validate_record(ReviewRecord::from_json(row)),
            Err(Error::MalformedReview { id: 6, .. })
        ));
        let unreadable = ReviewRecord::from_json(serde_json::json!("not a row"));
        assert!(validate_record(unreadable).is_err());
    }

    #[test]
    fn test_unapproved_record_is_malformed() {
        let mut pending = record(5);
        pending.is_approved = false;
        assert!(validate_record(pending).is_err());
    }

    #[test]
    fn test_new_review_is_trimmed() {
        let submitted = NewReview {
            name: "  Rui ".into(),
            rating: 5,
            comment: " Perfect weekend\n".into(),
        };
        let clean = validate_new_review(&submitted).unwrap();
        assert_eq!(clean.name, "Rui");
        assert_eq!(clean.comment, "Perfect weekend");
    }

    #[test]
    fn test_new_review_rejects_bad_input() {
        let base = NewReview {
            name: "Rui".into(),
            rating: 5,
            comment: "ok".into(),
        };

        let mut zero = base.clone();
        zero.rating = 0;
        assert!(matches!(validate_new_review(&zero), Err(Error::InvalidReview(_))));

        let mut empty = base.clone();
        empty.comment = " ".into();
        assert!(validate_new_review(&empty).is_err());

        let mut nameless = base;
        nameless.name = String::new();
        assert!(validate_new_review(&nameless).is_err());
    }
}

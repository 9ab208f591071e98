mod models;
mod validate;

pub use models::{NewReview, Review, ReviewFilter, ReviewRecord};
pub use validate::{validate_new_review, validate_record};

use anyhow::Result;

use reviewdeck_core::backend::ReviewBackend;
use reviewdeck_core::review::{validate_new_review, NewReview};

pub async fn run(backend: &dyn ReviewBackend, name: String, rating: u8, comment: String) -> Result<()> {
    let review = validate_new_review(&NewReview {
        name,
        rating,
        comment,
    })?;

    backend.submit_review(&review).await?;
    println!(
        "Thanks, {}! Your review will appear once it has been approved.",
        review.name
    );
    Ok(())
}

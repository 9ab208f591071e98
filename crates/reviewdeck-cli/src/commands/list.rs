use anyhow::Result;

use reviewdeck_core::backend::ReviewBackend;
use reviewdeck_core::review::ReviewFilter;

pub async fn run(backend: &dyn ReviewBackend, filter: ReviewFilter) -> Result<()> {
    let reviews = backend.list_reviews(filter).await?;

    if reviews.is_empty() {
        println!("No {} reviews.", filter);
        return Ok(());
    }

    println!("Reviews ({}, {}):\n", filter, reviews.len());

    for review in &reviews {
        let filled = review.rating.clamp(0, 5) as usize;
        let stars = format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled));
        let state = if review.is_approved { "" } else { " [pending]" };

        println!("  #{} {} {}{}", review.id, stars, review.client_name, state);
        if let Some(created) = review.created_at {
            println!("    {}", created.format("%Y-%m-%d %H:%M"));
        }
        println!("    \"{}\"", review.comment);
        println!();
    }

    Ok(())
}

use anyhow::Result;

use reviewdeck_core::backend::ReviewBackend;

pub async fn approve(backend: &dyn ReviewBackend, id: i64) -> Result<()> {
    if backend.approve_review(id).await? {
        println!("Approved review #{}.", id);
    } else {
        println!("No review with id {}.", id);
    }
    Ok(())
}

pub async fn delete(backend: &dyn ReviewBackend, id: i64) -> Result<()> {
    if backend.delete_review(id).await? {
        println!("Deleted review #{}.", id);
    } else {
        println!("No review with id {}.", id);
    }
    Ok(())
}

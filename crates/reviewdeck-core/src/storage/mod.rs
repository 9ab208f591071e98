mod database;
mod review_repo;

pub use database::Database;
pub use review_repo::ReviewRepository;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument. Multi-statement writes
//! run inside a single transaction.

pub mod category_repo;
pub mod tag_repo;
pub mod template_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use tag_repo::TagRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;

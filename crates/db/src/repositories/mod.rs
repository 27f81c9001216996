//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

mod positions;

pub mod block_progress_repo;
pub mod block_repo;
pub mod chapter_repo;
pub mod course_repo;
pub mod lesson_repo;
pub mod member_repo;
pub mod organization_repo;
pub mod user_repo;

pub use block_progress_repo::BlockProgressRepo;
pub use block_repo::BlockRepo;
pub use chapter_repo::ChapterRepo;
pub use course_repo::CourseRepo;
pub use lesson_repo::LessonRepo;
pub use member_repo::MemberRepo;
pub use organization_repo::OrganizationRepo;
pub use user_repo::UserRepo;

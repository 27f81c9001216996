pub mod auth;
pub mod block;
pub mod chapter;
pub mod course;
pub mod lesson;
pub mod organization;
pub mod player;
pub mod plugins;

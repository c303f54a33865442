//! Routed pages.

pub mod blog;
pub mod blog_post;
pub mod careers;
pub mod case_studies;
pub mod home;
pub mod not_found;

//! API endpoint implementations.

mod edits;
mod repos;

pub use edits::EditsApi;
pub use repos::{DEFAULT_BRANCH, ReposApi};

//! LMS REST API access: dispatch, pagination, and one fetcher per endpoint.

pub mod client;
pub mod pagination;
pub mod types;

mod accounts;
mod assignments;
mod courses;
mod enrollments;
mod grading_standards;
mod sections;
mod submissions;
mod users;

pub use client::CanvasClient;
pub use pagination::{PageState, Paginator, parse_next_link};

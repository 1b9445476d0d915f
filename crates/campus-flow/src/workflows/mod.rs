pub(crate) mod http;

pub mod enrollment;
pub mod jobs;
pub mod linking;
pub mod payments;
pub mod promotion;
pub mod reporting;
pub mod school;

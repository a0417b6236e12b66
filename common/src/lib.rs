//! Types shared between the merge backend and the clients that drive it.

pub mod jobs;
pub mod model;
pub mod requests;

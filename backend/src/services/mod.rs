pub mod carbon;
pub mod github;
pub mod session_store;
pub mod workflow;

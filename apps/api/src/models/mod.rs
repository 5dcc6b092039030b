pub mod ai;
pub mod application;
pub mod cv;
pub mod job;
pub mod session;
pub mod user;

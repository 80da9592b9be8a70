pub mod approval;
pub mod session;

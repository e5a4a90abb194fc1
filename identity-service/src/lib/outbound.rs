pub mod federation;
pub mod repositories;

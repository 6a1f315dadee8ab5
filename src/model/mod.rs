pub mod api;
pub mod metadata;
pub mod survey;
pub mod trip;
pub mod user;

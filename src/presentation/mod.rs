// Presentation layer - Published view and HTTP surface
pub mod app_state;
pub mod handlers;
pub mod published_view;

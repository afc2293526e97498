pub mod idea_api;
pub mod oauth;

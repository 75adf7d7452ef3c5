pub mod account;
pub mod auth;
pub mod chat;
pub mod orders;
pub mod products;
pub mod support;

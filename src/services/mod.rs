pub mod account_service;
pub mod auth_service;
pub mod catalog_service;
pub mod chat_service;
pub mod checkout_service;
pub mod support_service;

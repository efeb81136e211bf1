pub mod accounts;
pub mod chat;
pub mod health;

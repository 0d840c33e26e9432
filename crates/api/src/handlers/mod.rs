pub mod notification;
pub mod services;
pub mod user;

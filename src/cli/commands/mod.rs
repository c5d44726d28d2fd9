pub mod absence;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod students;
pub mod views;

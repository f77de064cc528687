// src/handlers.rs

pub mod associates;
pub mod auth;
pub mod corporations;
pub mod documents;
pub mod messages;
pub mod scan;
pub mod signup;
pub mod sync;
pub mod tips;
pub mod uploads;

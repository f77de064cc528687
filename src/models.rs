// src/models.rs

pub mod associate;
pub mod auth;
pub mod corporation;
pub mod join_request;
pub mod message;
pub mod payment;
pub mod report;
pub mod scan;
pub mod session;
pub mod signup;
pub mod tip;
pub mod user;

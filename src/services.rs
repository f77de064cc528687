// src/services.rs

pub mod associate_service;
pub mod auth;
pub mod corporate_service;
pub mod document_service;
pub mod guard;
pub mod message_service;
pub mod note_service;
pub mod payment;
pub mod profile_service;
pub mod report_service;
pub mod scan_service;
pub mod signup_service;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tip_service;

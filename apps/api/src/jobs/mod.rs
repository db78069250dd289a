// Posted jobs: form validation, persistence and photo storage.

pub mod form;
pub mod handlers;
pub mod repository;
pub mod storage;

pub mod application;
pub mod collect_service;
pub mod domain;
pub mod infrastructure;

// Helpdesk dashboard - Aggregation, filtering and formatting over a CRUD data API
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

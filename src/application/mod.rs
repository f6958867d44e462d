// Application layer - Stores, series building, use cases and polling
pub mod aggregate_store;
pub mod catalog_service;
pub mod colors;
pub mod dashboard_service;
pub mod dashboard_state;
pub mod error;
pub mod measurement_repository;
pub mod poll_scheduler;
pub mod sample_store;
pub mod selection_filter;
pub mod series_builder;

pub mod dto;
pub mod entity;
pub mod export;
pub mod handler;
pub mod reconcile;
pub mod service;
pub mod statistics;

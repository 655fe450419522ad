pub mod entity;
pub mod repository;
pub mod state;
pub mod transition;

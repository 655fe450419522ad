pub mod dto;
pub mod query;
pub mod reconciler;
pub mod use_case;

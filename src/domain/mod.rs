pub mod shared;
pub mod vote;

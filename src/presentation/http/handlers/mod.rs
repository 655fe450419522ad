pub mod health;
pub mod votes;

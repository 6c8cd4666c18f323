pub mod health;
pub mod middleware;
pub mod ratings;
pub mod records;

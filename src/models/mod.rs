pub mod article;
pub mod error;
pub mod jwt;
pub mod listing;
pub mod news;
pub mod rating;
pub mod resource;
pub mod tool;

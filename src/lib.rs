pub mod admin;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod imaging;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod specs;
pub mod state;

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod common;
pub mod config;
pub mod db;
pub mod domain;
pub mod http;
pub mod observability;
pub mod repos;

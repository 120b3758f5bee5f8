pub mod app_config;
pub mod constants;
pub mod conversations;
pub mod db;
pub mod middleware;
pub mod orm;
pub mod session;
pub mod storage;
pub mod upload;
pub mod user;
pub mod web;

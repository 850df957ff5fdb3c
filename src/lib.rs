pub mod app_config;
pub mod constants;
pub mod db;
pub mod flash;
pub mod ip;
pub mod middleware;
pub mod orm;
pub mod poll;
pub mod rate_limit;
pub mod session;
pub mod storage;
pub mod user;
pub mod web;

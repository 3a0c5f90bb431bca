pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod id;
pub mod links;
pub mod model;
pub mod response;
pub mod store;
pub mod util;

#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate serde;

pub mod config;
pub mod directory;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod state;

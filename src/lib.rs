pub mod codec;
pub mod config;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod pointer;
pub mod response;
pub mod routes;
pub mod state;

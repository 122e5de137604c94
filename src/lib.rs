pub mod config;
pub mod constants;
pub mod extractors;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod pose;
pub mod response;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
pub mod validation;
pub mod workers;

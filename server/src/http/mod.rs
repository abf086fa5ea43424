pub mod limit;
pub mod routes;

pub mod auth;
pub mod extract;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;

pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::AuthUser;

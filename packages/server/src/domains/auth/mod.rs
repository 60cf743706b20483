//! Auth domain - JWT issuance/verification and password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtService};
pub use password::{hash_password, verify_password};

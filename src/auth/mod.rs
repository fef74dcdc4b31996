pub mod gates;
mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtKeys, TokenError};
pub use middleware::{AuthError, CurrentUser};
pub use password::{hash_password, verify_password};

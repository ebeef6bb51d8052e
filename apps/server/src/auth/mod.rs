//! Authentication: JWT issuing/validation, password hashing, and the
//! request extractor that turns a Bearer token into a [`CurrentUser`].

pub mod extractor;
pub mod jwt;
pub mod password;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtManager};
pub use password::{hash_password, verify_password};

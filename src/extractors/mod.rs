mod auth_user;
mod json;
mod pagination;

pub use auth_user::{AuthUser, MaybeAuthUser};
pub use json::Json;
pub use pagination::Pagination;

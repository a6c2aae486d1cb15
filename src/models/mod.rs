pub mod category;
pub mod comment;
pub mod like;
pub mod post;
pub mod post_view;
pub mod profile;
pub mod user;

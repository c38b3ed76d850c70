pub mod cases;
pub mod user;

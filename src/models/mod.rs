pub mod question;
pub mod quiz;
pub mod quiz_result;
pub mod user;

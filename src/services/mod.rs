pub mod ai_service;
pub mod grading_service;
pub mod pdf_service;
pub mod quiz_service;
pub mod user_service;

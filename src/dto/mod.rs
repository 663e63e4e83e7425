pub mod auth_dto;
pub mod quiz_dto;
pub mod user_dto;

use serde::Serialize;

/// `{ "status": "success", "data": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

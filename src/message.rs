use crate::Error;
use crate::dictionary::Category;
use crate::engine::LetterMask;
use serde::{Deserialize, Serialize};

pub const SUCCESS_CODE: u32 = 130;
pub const SUCCESS_TYPE: &str = "user_success";
pub const ERROR_TYPE: &str = "user_error";

/// 平台统一的响应头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse {
    pub code: u32,
    pub message_type: String,
}

impl BaseResponse {
    pub fn success() -> Self {
        BaseResponse {
            code: SUCCESS_CODE,
            message_type: SUCCESS_TYPE.to_string(),
        }
    }
}

/// list_category 和 load_status 共用的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRequest {
    pub user_id: i64,
    pub game_id: i64,
    pub game_token: String,
    #[serde(default)]
    pub device_name: Option<String>,
}

/// pick_word 和 reset 的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickWordRequest {
    pub user_id: i64,
    pub game_id: i64,
    pub category_id: i64,
    pub game_token: String,
    #[serde(default)]
    pub device_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub user_id: i64,
    pub game_id: i64,
    pub current_letter: LetterInput,
    pub game_token: String,
    #[serde(default)]
    pub device_name: Option<String>,
}

/// 平台客户端发送字节值（如 97），也兼容单字符字符串
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LetterInput {
    Byte(u8),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCategoryResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub categories: Vec<Category>,
}

/// pick_word、reset 和 load_status 的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordStatusResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub current_word: String,
    #[serde(rename = "status")]
    pub letter_status: LetterMask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    /// 这次猜测是否猜中
    pub true_or_false: bool,
    pub ending: bool,
    pub current_word: String,
    pub letter_status: LetterMask,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub message: String,
}

impl Error {
    /// 平台错误码
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidRequest(_) | Error::InvalidLetter(_) => 102,
            Error::WrongGame(_) => 103,
            Error::UserNotFound(_) => 112,
            Error::InvalidToken => 115,
            Error::NoActiveGame(_) => 131,
            Error::NoWordsInCategory(_) => 132,
            Error::GameEnded => 133,
            Error::Persistence(_)
            | Error::SessionStore(_)
            | Error::InvalidWord(_)
            | Error::Network(_) => 101,
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        ErrorResponse {
            base: BaseResponse {
                code: error.code(),
                message_type: ERROR_TYPE.to_string(),
            },
            message: error.to_string(),
        }
    }
}

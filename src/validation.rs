use crate::engine::Letter;
use crate::message::{GameRequest, LetterInput, PickWordRequest, ValidateRequest};
use crate::{Error, Result};

const MAX_TOKEN_LENGTH: usize = 256;
const MAX_DEVICE_NAME_LENGTH: usize = 64;

/// 所有请求共有字段的检查
pub fn check_common(user_id: i64, game_token: &str, device_name: Option<&str>) -> Result<()> {
    if user_id <= 0 {
        return Err(Error::InvalidRequest(format!("user_id 无效: {}", user_id)));
    }

    // 检查令牌
    if game_token.trim().is_empty() {
        return Err(Error::InvalidRequest("game_token 不能为空".to_string()));
    }
    if game_token.len() > MAX_TOKEN_LENGTH {
        return Err(Error::InvalidRequest(format!(
            "game_token 长度超过限制: {}",
            MAX_TOKEN_LENGTH
        )));
    }

    if let Some(device_name) = device_name {
        if device_name.len() > MAX_DEVICE_NAME_LENGTH {
            return Err(Error::InvalidRequest(format!(
                "device_name 长度超过限制: {}",
                MAX_DEVICE_NAME_LENGTH
            )));
        }
    }

    Ok(())
}

/// 把请求里的字母转成合法的 [`Letter`]
pub fn parse_letter(input: &LetterInput) -> Result<Letter> {
    match input {
        LetterInput::Byte(byte) => Letter::from_byte(*byte),
        LetterInput::Text(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Letter::from_char(c),
                _ => Err(Error::InvalidRequest(format!(
                    "current_letter 必须是单个字符: {:?}",
                    text
                ))),
            }
        }
    }
}

impl GameRequest {
    pub fn check(&self) -> Result<()> {
        check_common(self.user_id, &self.game_token, self.device_name.as_deref())
    }
}

impl PickWordRequest {
    pub fn check(&self) -> Result<()> {
        check_common(self.user_id, &self.game_token, self.device_name.as_deref())?;
        if self.category_id <= 0 {
            return Err(Error::InvalidRequest(format!(
                "category_id 无效: {}",
                self.category_id
            )));
        }
        Ok(())
    }
}

impl ValidateRequest {
    /// 检查通过时返回规范化后的字母
    pub fn check(&self) -> Result<Letter> {
        check_common(self.user_id, &self.game_token, self.device_name.as_deref())?;
        parse_letter(&self.current_letter)
    }
}

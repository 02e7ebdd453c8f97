use crate::dictionary;
use crate::engine::{self, LetterMask, SecretWord};
use crate::message::{
    BaseResponse, GameRequest, ListCategoryResponse, PickWordRequest, ValidateRequest,
    ValidateResponse, WordStatusResponse,
};
use crate::session::TokenStore;
use crate::storage::{Storage, User};
use crate::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 本游戏在平台上的固定ID
pub const HANGMAN_GAME_ID: i64 = 1;

/// 猜单词游戏管理器
pub struct HangmanManager {
    storage: Storage,
    tokens: TokenStore,
    /// 同一用户的读改写必须串行
    user_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl HangmanManager {
    pub fn new(storage: Storage, tokens: TokenStore) -> Self {
        HangmanManager {
            storage,
            tokens,
            user_locks: DashMap::new(),
        }
    }

    /// 依次检查用户、游戏ID和令牌
    async fn authorize(
        &self,
        user_id: i64,
        game_id: i64,
        game_token: &str,
        device_name: Option<&str>,
    ) -> Result<User> {
        let user = self
            .storage
            .find_user(user_id)
            .await?
            .ok_or(Error::UserNotFound(user_id))?;

        if game_id != HANGMAN_GAME_ID {
            return Err(Error::WrongGame(game_id));
        }

        if !self.tokens.verify(user_id, game_id, game_token).await? {
            return Err(Error::InvalidToken);
        }

        debug!(
            "用户 {} ({}) 校验通过，设备: {}",
            user.id,
            user.username,
            device_name.unwrap_or("-")
        );
        Ok(user)
    }

    fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 获取所有分类
    pub async fn list_category(&self, request: GameRequest) -> Result<ListCategoryResponse> {
        request.check()?;
        self.authorize(
            request.user_id,
            request.game_id,
            &request.game_token,
            request.device_name.as_deref(),
        )
        .await?;

        let categories = self.storage.list_categories().await?;
        Ok(ListCategoryResponse {
            base: BaseResponse::success(),
            categories,
        })
    }

    /// 从分类中随机选词并开始新的一局，也用于重置
    pub async fn pick_word(&self, request: PickWordRequest) -> Result<WordStatusResponse> {
        request.check()?;
        let user = self
            .authorize(
                request.user_id,
                request.game_id,
                &request.game_token,
                request.device_name.as_deref(),
            )
            .await?;

        let words = self.storage.category_words(request.category_id).await?;
        let word = dictionary::pick_word(&words)
            .ok_or(Error::NoWordsInCategory(request.category_id))?;

        let lock = self.user_lock(user.id);
        let _guard = lock.lock().await;

        self.storage
            .start_game(user.id, request.game_id, word.as_str())
            .await?;
        info!(
            "用户 {} 在分类 {} 选词，长度 {}",
            user.id,
            request.category_id,
            word.len()
        );

        let reveal = engine::compute_display(&word, LetterMask::EMPTY);
        Ok(WordStatusResponse {
            base: BaseResponse::success(),
            current_word: reveal.display,
            letter_status: LetterMask::EMPTY,
            ending: None,
        })
    }

    /// 读取当前进度
    pub async fn load_status(&self, request: GameRequest) -> Result<WordStatusResponse> {
        request.check()?;
        let user = self
            .authorize(
                request.user_id,
                request.game_id,
                &request.game_token,
                request.device_name.as_deref(),
            )
            .await?;

        let record = self
            .storage
            .load_guess_state(user.id)
            .await?
            .ok_or(Error::NoActiveGame(user.id))?;
        let word = SecretWord::parse(&record.word)?;
        let reveal = engine::compute_display(&word, record.mask);
        let ending = reveal.is_ending(record.mask);

        Ok(WordStatusResponse {
            base: BaseResponse::success(),
            current_word: reveal.display,
            letter_status: record.mask,
            ending: Some(ending),
        })
    }

    /// 校验玩家猜的字母
    pub async fn validate(&self, request: ValidateRequest) -> Result<ValidateResponse> {
        let letter = request.check()?;
        let user = self
            .authorize(
                request.user_id,
                request.game_id,
                &request.game_token,
                request.device_name.as_deref(),
            )
            .await?;

        let lock = self.user_lock(user.id);
        let _guard = lock.lock().await;

        let record = self
            .storage
            .load_guess_state(user.id)
            .await?
            .ok_or(Error::NoActiveGame(user.id))?;
        let word = SecretWord::parse(&record.word)?;

        if engine::has_ended(&word, record.mask) {
            warn!("用户 {} 的游戏已结束，拒绝字母 {}", user.id, letter);
            return Err(Error::GameEnded);
        }

        let guess = engine::apply_guess(&word, record.mask, letter);
        let ending = guess.ending();
        self.storage
            .record_guess(user.id, request.game_id, guess.mask, ending)
            .await?;

        debug!(
            "用户 {} 猜字母 {}: 猜中 {}，已猜 {} 个",
            user.id,
            letter,
            guess.changed,
            guess.mask.guessed_count()
        );
        if ending {
            info!(
                "用户 {} 的游戏结束，全部猜出: {}",
                user.id, guess.reveal.fully_revealed
            );
        }

        Ok(ValidateResponse {
            base: BaseResponse::success(),
            true_or_false: guess.changed,
            ending,
            current_word: guess.reveal.display,
            letter_status: guess.mask,
        })
    }
}

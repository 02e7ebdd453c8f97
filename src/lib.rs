pub mod config;
pub mod dictionary;
pub mod engine;
pub mod hangman;
pub mod message;
pub mod network;
pub mod session;
pub mod storage;
pub mod validation;

pub use config::Config;
pub use engine::{Letter, LetterMask, SecretWord};
pub use hangman::HangmanManager;
pub use network::HangmanServer;
pub use session::TokenStore;
pub use storage::Storage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("网络错误: {0}")]
    Network(#[from] anyhow::Error),
    #[error("请求无效: {0}")]
    InvalidRequest(String),
    #[error("无效的字母 {0:?}，只接受 a-z 或 A-Z")]
    InvalidLetter(char),
    #[error("用户 {0} 不存在")]
    UserNotFound(i64),
    #[error("游戏 {0} 不是猜单词游戏")]
    WrongGame(i64),
    #[error("游戏令牌无效")]
    InvalidToken,
    #[error("分类 {0} 没有词语")]
    NoWordsInCategory(i64),
    #[error("用户 {0} 没有进行中的游戏")]
    NoActiveGame(i64),
    #[error("游戏已结束，请重新选词")]
    GameEnded,
    #[error("词库中的词 {0:?} 不是小写字母")]
    InvalidWord(String),
    #[error("存储错误: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("会话存储错误: {0}")]
    SessionStore(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, Error>;

use crate::Result;
use dashmap::DashMap;
use redis::AsyncCommands;
use redis::Client;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// 平台下发的游戏令牌存储
#[derive(Clone)]
pub enum TokenStore {
    Redis(Arc<Mutex<ConnectionManager>>),
    Memory(Arc<DashMap<(i64, i64), String>>),
}

impl TokenStore {
    pub async fn redis(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(TokenStore::Redis(Arc::new(Mutex::new(manager))))
    }

    pub fn memory() -> Self {
        TokenStore::Memory(Arc::new(DashMap::new()))
    }

    /// 保存令牌（生产环境由平台写入，这里供内存存储使用）
    pub async fn issue(&self, user_id: i64, game_id: i64, token: &str) -> Result<()> {
        match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.lock().await;
                conn.set::<_, _, ()>(token_key(user_id, game_id), token)
                    .await?;
            }
            TokenStore::Memory(tokens) => {
                tokens.insert((user_id, game_id), token.to_string());
            }
        }
        debug!(
            "保存令牌: 用户 {} 游戏 {} ({})",
            user_id,
            game_id,
            fingerprint(token)
        );
        Ok(())
    }

    /// 校验令牌
    pub async fn verify(&self, user_id: i64, game_id: i64, token: &str) -> Result<bool> {
        let stored = match self {
            TokenStore::Redis(manager) => {
                let mut conn = manager.lock().await;
                conn.get::<_, Option<String>>(token_key(user_id, game_id))
                    .await?
            }
            TokenStore::Memory(tokens) => tokens
                .get(&(user_id, game_id))
                .map(|entry| entry.value().clone()),
        };

        let valid = match stored {
            Some(stored) => Sha256::digest(stored.as_bytes()) == Sha256::digest(token.as_bytes()),
            None => false,
        };
        debug!(
            "令牌校验: 用户 {} 游戏 {} ({}) -> {}",
            user_id,
            game_id,
            fingerprint(token),
            valid
        );
        Ok(valid)
    }
}

fn token_key(user_id: i64, game_id: i64) -> String {
    format!("game_token:{}:{}", user_id, game_id)
}

/// 日志中只输出令牌摘要的前8位
fn fingerprint(token: &str) -> String {
    let hash = hex::encode(Sha256::digest(token.as_bytes()));
    hash[..8].to_string()
}

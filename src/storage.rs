use crate::Result;
use crate::dictionary::{Category, DictEntry};
use crate::engine::LetterMask;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions};
use sqlx::Transaction;
use tracing::{debug, info};

/// 游戏进行中
pub const STATUS_PLAYING: i64 = 1;
/// 游戏已结束
pub const STATUS_ENDED: i64 = 0;

const SCHEMA: [&str; 5] = [
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        username TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS game_status (
        user_id INTEGER NOT NULL,
        game_id INTEGER NOT NULL,
        status INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, game_id)
    )",
    "CREATE TABLE IF NOT EXISTS hangman_category (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS hangman_dict (
        id INTEGER PRIMARY KEY,
        category_id INTEGER NOT NULL REFERENCES hangman_category(id),
        word TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS hangman (
        id INTEGER PRIMARY KEY,
        user_id INTEGER NOT NULL UNIQUE,
        word TEXT NOT NULL,
        letter_status INTEGER NOT NULL DEFAULT 0
    )",
];

/// 平台用户
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// 用户当前的猜词记录，词语未经校验
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub word: String,
    pub mask: LetterMask,
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// 连接数据库并建表
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        let storage = Storage { pool };
        storage.init_schema().await?;
        info!("数据库已连接: {}", database_url);
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("数据表已就绪");
        Ok(())
    }

    /// 获取用户信息
    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// 获取所有分类
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM hangman_category ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// 获取分类下的所有词语
    pub async fn category_words(&self, category_id: i64) -> Result<Vec<String>> {
        let words = sqlx::query_scalar::<_, String>(
            "SELECT word FROM hangman_dict WHERE category_id = ? ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(words)
    }

    pub async fn all_entries(&self) -> Result<Vec<DictEntry>> {
        let entries = sqlx::query_as::<_, DictEntry>(
            "SELECT id, category_id, word FROM hangman_dict ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// 开始新的一局：写入新词、清空掩码，并把游戏状态置为进行中
    pub async fn start_game(&self, user_id: i64, game_id: i64, word: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO hangman (user_id, word, letter_status) VALUES (?, ?, 0)
             ON CONFLICT(user_id) DO UPDATE SET word = excluded.word, letter_status = 0",
        )
        .bind(user_id)
        .bind(word)
        .execute(&mut *tx)
        .await?;

        set_game_status(&mut tx, user_id, game_id, STATUS_PLAYING).await?;
        tx.commit().await?;

        debug!("用户 {} 开始新的一局", user_id);
        Ok(())
    }

    /// 读取用户当前的猜词记录
    pub async fn load_guess_state(&self, user_id: i64) -> Result<Option<GuessRecord>> {
        let row = sqlx::query_as::<_, (String, i64)>(
            "SELECT word, letter_status FROM hangman WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(word, bits)| GuessRecord {
            word,
            mask: LetterMask::from_bits(bits as u32),
        }))
    }

    /// 保存猜测后的掩码，游戏结束时同时更新游戏状态
    pub async fn record_guess(
        &self,
        user_id: i64,
        game_id: i64,
        mask: LetterMask,
        ending: bool,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE hangman SET letter_status = ? WHERE user_id = ?")
            .bind(i64::from(mask.bits()))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if ending {
            set_game_status(&mut tx, user_id, game_id, STATUS_ENDED).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn game_status(&self, user_id: i64, game_id: i64) -> Result<Option<i64>> {
        let status = sqlx::query_scalar::<_, i64>(
            "SELECT status FROM game_status WHERE user_id = ? AND game_id = ?",
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(status)
    }
}

async fn set_game_status(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    game_id: i64,
    status: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO game_status (user_id, game_id, status, updated_at) VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, game_id) DO UPDATE SET status = excluded.status, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(game_id)
    .bind(status)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
impl Storage {
    pub(crate) async fn memory() -> Self {
        Storage::connect("sqlite::memory:", 1).await.unwrap()
    }

    pub(crate) async fn add_user(&self, id: i64, username: &str) {
        sqlx::query("INSERT INTO users (id, username) VALUES (?, ?)")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub(crate) async fn add_category(&self, id: i64, name: &str) {
        sqlx::query("INSERT INTO hangman_category (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub(crate) async fn add_word(&self, category_id: i64, word: &str) {
        sqlx::query("INSERT INTO hangman_dict (category_id, word) VALUES (?, ?)")
            .bind(category_id)
            .bind(word)
            .execute(&self.pool)
            .await
            .unwrap();
    }
}

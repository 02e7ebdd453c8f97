//! 猜字母状态机
//!
//! 一局游戏就是 [`SecretWord`] 加上已猜字母的 [`LetterMask`]。
//! 显示词、是否全部揭示以及结束判定都只由这两者推导，没有副作用。

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 未猜中字母的占位符
pub const PLACEHOLDER: char = '*';

/// 猜过的不同字母达到这个数量时游戏强制结束
pub const GUESS_LIMIT: u32 = 7;

const ALL_LETTERS: u32 = (1 << 26) - 1;

/// 玩家猜的字母，统一存为小写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Letter(u8);

impl Letter {
    /// 只接受 `a-z` 和 `A-Z`，大写转为小写
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte.is_ascii_alphabetic() {
            Ok(Letter(byte.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidLetter(char::from(byte)))
        }
    }

    pub fn from_char(c: char) -> Result<Self> {
        u8::try_from(c)
            .map_err(|_| Error::InvalidLetter(c))
            .and_then(Self::from_byte)
    }

    pub fn as_char(self) -> char {
        char::from(self.0)
    }

    fn bit(self) -> u32 {
        1 << (self.0 - b'a')
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 已猜字母集合，第 i 位对应 `'a' + i`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LetterMask(u32);

impl LetterMask {
    pub const EMPTY: LetterMask = LetterMask(0);

    /// 超出26个字母的高位直接丢弃
    pub fn from_bits(bits: u32) -> Self {
        LetterMask(bits & ALL_LETTERS)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, letter: Letter) -> bool {
        self.0 & letter.bit() != 0
    }

    pub fn with(self, letter: Letter) -> Self {
        LetterMask(self.0 | letter.bit())
    }

    /// 已猜的不同字母数
    pub fn guessed_count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn letters(self) -> impl Iterator<Item = Letter> {
        (b'a'..=b'z')
            .map(Letter)
            .filter(move |letter| self.contains(*letter))
    }
}

/// 待猜的词：非空，只含小写 `a-z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretWord(String);

impl SecretWord {
    pub fn parse(word: &str) -> Result<Self> {
        if !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase()) {
            Ok(SecretWord(word.to_string()))
        } else {
            Err(Error::InvalidWord(word.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        self.0.bytes().map(Letter)
    }
}

impl fmt::Display for SecretWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 当前掩码下玩家看到的词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub display: String,
    pub fully_revealed: bool,
}

impl Reveal {
    /// 全部揭示或猜测次数用尽即结束
    pub fn is_ending(&self, mask: LetterMask) -> bool {
        self.fully_revealed || mask.guessed_count() >= GUESS_LIMIT
    }
}

/// 猜一个字母后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    pub mask: LetterMask,
    /// 这次猜测揭开了之前隐藏的字母
    pub changed: bool,
    pub reveal: Reveal,
}

impl Guess {
    pub fn ending(&self) -> bool {
        self.reveal.is_ending(self.mask)
    }
}

pub fn compute_display(word: &SecretWord, mask: LetterMask) -> Reveal {
    let mut fully_revealed = true;
    let display = word
        .letters()
        .map(|letter| {
            if mask.contains(letter) {
                letter.as_char()
            } else {
                fully_revealed = false;
                PLACEHOLDER
            }
        })
        .collect();

    Reveal {
        display,
        fully_revealed,
    }
}

pub fn apply_guess(word: &SecretWord, mask: LetterMask, letter: Letter) -> Guess {
    let before = compute_display(word, mask);
    let mask = mask.with(letter);
    let reveal = compute_display(word, mask);

    Guess {
        mask,
        changed: before.display != reveal.display,
        reveal,
    }
}

/// 已保存的 `(word, mask)` 是否已经结束
pub fn has_ended(word: &SecretWord, mask: LetterMask) -> bool {
    compute_display(word, mask).is_ending(mask)
}

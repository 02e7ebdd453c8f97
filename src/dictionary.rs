use crate::engine::SecretWord;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// 词语分类
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// 词库中的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DictEntry {
    pub id: i64,
    pub category_id: i64,
    pub word: String,
}

/// 从候选词中随机选一个合法的词
pub fn pick_word(words: &[String]) -> Option<SecretWord> {
    let valid: Vec<SecretWord> = words
        .iter()
        .filter_map(|word| match SecretWord::parse(word) {
            Ok(secret) => Some(secret),
            Err(e) => {
                warn!("跳过不合法的词: {}", e);
                None
            }
        })
        .collect();

    let mut rng = rand::rng();
    valid.choose(&mut rng).cloned()
}

#[derive(Debug, Clone, Default)]
pub struct DictionaryStats {
    pub total_categories: usize,
    pub total_words: usize,
    pub invalid_words: usize,
    /// 分类名 -> 词数
    pub category_stats: BTreeMap<String, usize>,
}

/// 获取词库统计信息
pub fn stats(categories: &[Category], entries: &[DictEntry]) -> DictionaryStats {
    let mut category_stats: BTreeMap<String, usize> = categories
        .iter()
        .map(|category| (category.name.clone(), 0))
        .collect();

    for entry in entries {
        if let Some(category) = categories.iter().find(|c| c.id == entry.category_id) {
            *category_stats.entry(category.name.clone()).or_insert(0) += 1;
        }
    }

    DictionaryStats {
        total_categories: categories.len(),
        total_words: entries.len(),
        invalid_words: entries
            .iter()
            .filter(|entry| SecretWord::parse(&entry.word).is_err())
            .count(),
        category_stats,
    }
}

/// 验证词库完整性
pub fn validate(categories: &[Category], entries: &[DictEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    let known: HashSet<i64> = categories.iter().map(|c| c.id).collect();

    for category in categories {
        if !entries.iter().any(|entry| entry.category_id == category.id) {
            errors.push(format!(
                "分类 '{}' (id {}) 没有词语",
                category.name, category.id
            ));
        }
    }

    for entry in entries {
        if !known.contains(&entry.category_id) {
            errors.push(format!(
                "词 {} ({:?}) 所属分类 {} 不存在",
                entry.id, entry.word, entry.category_id
            ));
        }
        if SecretWord::parse(&entry.word).is_err() {
            errors.push(format!(
                "词 {} ({:?}) 不是小写字母",
                entry.id, entry.word
            ));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
        }
    }

    fn entry(id: i64, category_id: i64, word: &str) -> DictEntry {
        DictEntry {
            id,
            category_id,
            word: word.to_string(),
        }
    }

    #[test]
    fn picks_only_valid_words() {
        let words = vec!["Bad Word".to_string(), "apple".to_string(), "".to_string()];
        for _ in 0..20 {
            assert_eq!(pick_word(&words).unwrap().as_str(), "apple");
        }
    }

    #[test]
    fn pick_from_nothing_is_none() {
        assert!(pick_word(&[]).is_none());
        assert!(pick_word(&["42".to_string()]).is_none());
    }

    #[test]
    fn pick_covers_every_word() {
        let words: Vec<String> = ["ant", "bee", "cow"].iter().map(|w| w.to_string()).collect();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_word(&words).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn stats_count_per_category() {
        let categories = vec![category(1, "animals"), category(2, "fruit")];
        let entries = vec![entry(1, 1, "cat"), entry(2, 1, "dog"), entry(3, 2, "Kiwi")];
        let stats = stats(&categories, &entries);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.invalid_words, 1);
        assert_eq!(stats.category_stats["animals"], 2);
        assert_eq!(stats.category_stats["fruit"], 1);
    }

    #[test]
    fn validate_reports_problems() {
        let categories = vec![category(1, "animals"), category(2, "empty")];
        let entries = vec![entry(1, 1, "cat"), entry(2, 1, "sea lion"), entry(3, 9, "owl")];
        let errors = validate(&categories, &entries);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("'empty'")));
        assert!(errors.iter().any(|e| e.contains("sea lion")));
        assert!(errors.iter().any(|e| e.contains("所属分类 9")));
    }

    #[test]
    fn clean_dictionary_validates() {
        let categories = vec![category(1, "animals")];
        let entries = vec![entry(1, 1, "cat")];
        assert!(validate(&categories, &entries).is_empty());
    }
}

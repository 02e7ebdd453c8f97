use clap::{App, SubCommand};
use hangman_server::config::Config;
use hangman_server::dictionary;
use hangman_server::storage::Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = App::new("词库查看器")
        .version("1.0")
        .about("只读查看猜单词游戏词库")
        .subcommand(SubCommand::with_name("list").about("列出所有分类和词数"))
        .subcommand(SubCommand::with_name("stats").about("显示词库统计信息"))
        .subcommand(SubCommand::with_name("validate").about("验证词库完整性"))
        .get_matches();

    // 初始化配置
    Config::init()?;
    let config = Config::get();

    let storage = Storage::connect(&config.database.url, 1).await?;
    let categories = storage.list_categories().await?;
    let entries = storage.all_entries().await?;

    match matches.subcommand() {
        Some(("list", _)) => {
            println!("词库分类列表:");
            for category in &categories {
                let words: Vec<&str> = entries
                    .iter()
                    .filter(|entry| entry.category_id == category.id)
                    .map(|entry| entry.word.as_str())
                    .collect();
                println!("  [{}] {}: {} 个词", category.id, category.name, words.len());
                for word in words {
                    println!("    {}", word);
                }
            }
        }
        Some(("stats", _)) => {
            let stats = dictionary::stats(&categories, &entries);
            println!("词库统计信息:");
            println!("  总分类数: {}", stats.total_categories);
            println!("  总词数: {}", stats.total_words);
            println!("  不合法的词: {}", stats.invalid_words);
            println!("  分类分布:");
            for (category, count) in &stats.category_stats {
                println!("    {}: {}", category, count);
            }
        }
        Some(("validate", _)) => {
            let errors = dictionary::validate(&categories, &entries);
            if errors.is_empty() {
                println!("词库验证通过！");
            } else {
                println!("词库验证发现 {} 个问题:", errors.len());
                for error in errors {
                    println!("  - {}", error);
                }
            }
        }
        _ => {
            println!("请使用 --help 查看可用命令");
        }
    }

    Ok(())
}

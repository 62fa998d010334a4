//! 文本预处理

/// 小写化、去除链接、合并多余空白；保留 emoji 和标点（对情绪有意义）
pub fn preprocess_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| !is_url(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://") || token.starts_with("www.")
}

/// 提取 `$TICKER` 形式的标的代码（1-5 个字母，去重，保持出现顺序）
pub fn extract_cashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        let Some(rest) = token.strip_prefix('$') else {
            continue;
        };
        let symbol: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        if symbol.is_empty() || symbol.len() > 5 {
            continue;
        }
        let symbol = symbol.to_uppercase();
        if !tags.contains(&symbol) {
            tags.push(symbol);
        }
    }
    tags
}

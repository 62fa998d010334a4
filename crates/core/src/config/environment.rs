use std::env;

/// 读取布尔型环境变量：支持 true/false/1/0（大小写不敏感）
pub fn env_is_true(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        }
        Err(_) => default,
    }
}

/// 读取字符串环境变量，若不存在则返回默认值
pub fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) => v,
        Err(_) => default.to_string(),
    }
}

/// 读取 i64 环境变量，不存在或解析失败返回默认值
pub fn env_i64(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(v) => v.trim().parse::<i64>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

/// 读取 usize 环境变量，不存在或解析失败返回默认值
pub fn env_usize(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

/// 读取 f64 环境变量，不存在或解析失败返回默认值
pub fn env_f64(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(v) => v.trim().parse::<f64>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        assert!(env_is_true("SENTIMENT_QUANT_TEST_MISSING_BOOL", true));
        assert_eq!(env_i64("SENTIMENT_QUANT_TEST_MISSING_I64", 7), 7);
        assert_eq!(env_usize("SENTIMENT_QUANT_TEST_MISSING_USIZE", 3), 3);
        assert_eq!(env_f64("SENTIMENT_QUANT_TEST_MISSING_F64", 2.5), 2.5);
        assert_eq!(env_or_default("SENTIMENT_QUANT_TEST_MISSING_STR", "x"), "x");
    }
}

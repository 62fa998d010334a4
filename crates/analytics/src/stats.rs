//! 基础统计函数

use statrs::distribution::{ContinuousCDF, StudentsT};

/// 标准差低于此值视为零（避免浮点残差被当成有效波动）
pub const STD_EPSILON: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// 总体标准差（ddof = 0）
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// 样本标准差（ddof = 1），少于 2 个值时无定义
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Pearson 相关系数
///
/// 长度不一致、少于 2 个点或任一侧方差为零时返回 None。
/// 两点时结果恒为 ±1，直接按协方差符号给出精确值。
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x.sqrt() < STD_EPSILON || var_y.sqrt() < STD_EPSILON {
        return None;
    }
    if x.len() == 2 {
        return Some(cov.signum());
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Pearson 相关的双尾 p 值，t = r·sqrt((n-2)/(1-r²))，自由度 n-2
///
/// n ≤ 2 时没有剩余自由度，返回 1.0；|r| = 1 时返回 0.0。
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if n <= 2 || !r.is_finite() {
        return 1.0;
    }
    if r.abs() >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.cdf(-t.abs())).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

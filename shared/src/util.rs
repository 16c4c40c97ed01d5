/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 当前 UTC 时间的 ISO-8601 字符串（通知时间戳用）
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

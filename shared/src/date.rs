//! 时间类型模块
//!
//! `Timestamp`: 可序列化的毫秒时间戳，用于传输和存储。
//! 后端以 JS `Date.now()` 风格的整数毫秒返回时间字段。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// 创建新的时间戳
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 获取毫秒值
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// 转换为 chrono 的 UTC 时间（毫秒值越界时返回 None）
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// 格式化为 `YYYY-MM-DD`，供界面显示
    pub fn format_date(&self) -> String {
        self.to_utc()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_integer() {
        let ts = Timestamp::new(1_700_000_000_000);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000000");
        let back: Timestamp = serde_json::from_str("1700000000000").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn formats_utc_date() {
        // 2023-11-14T22:13:20Z
        let ts = Timestamp::new(1_700_000_000_000);
        assert_eq!(ts.format_date(), "2023-11-14");
    }
}

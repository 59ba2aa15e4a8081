//! 会话 ID 生成

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// 随机后缀长度
const SUFFIX_LEN: usize = 9;

/// 生成会话 ID：`session_<毫秒时间戳>_<随机后缀>`
///
/// 只保证尽力唯一，不可作为安全令牌使用。
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    format!("session_{}_{}", now.timestamp_millis(), suffix)
}

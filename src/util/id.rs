use chrono::Utc;
use uuid::Uuid;

const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new opaque task ID: `<base36 millis>-<6 random chars>`.
///
/// The time prefix keeps IDs roughly creation-ordered; the random suffix
/// makes same-millisecond collisions negligible.
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let random = Uuid::new_v4().as_u128();
    let suffix: String = to_base36(random).chars().take(SUFFIX_LEN).collect();
    format!("{}-{:0>width$}", to_base36(millis), suffix, width = SUFFIX_LEN)
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

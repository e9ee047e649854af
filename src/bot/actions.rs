//! Callback data codec for menu buttons

/// Telegram limit for `callback_data`, in bytes
pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

const RELOAD_TOKEN: &str = "RELOAD";
const COURSE_PREFIX: &str = "CUR|";

/// Menu actions routed back to the bot through button presses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Display the catalog menu again
    ShowList,
    /// Display one course's detail
    ShowCourse(String),
}

impl Action {
    /// Build a course action, bounding the id so the encoded token fits the
    /// transport limit
    pub fn show_course(id: impl Into<String>) -> Self {
        let id = id.into();
        let limit = MAX_CALLBACK_DATA_BYTES - COURSE_PREFIX.len();
        Action::ShowCourse(truncate_to_bytes(&id, limit).to_string())
    }

    /// Encode as callback data
    pub fn encode(&self) -> String {
        match self {
            Action::ShowList => RELOAD_TOKEN.to_string(),
            Action::ShowCourse(id) => {
                let limit = MAX_CALLBACK_DATA_BYTES - COURSE_PREFIX.len();
                format!("{COURSE_PREFIX}{}", truncate_to_bytes(id, limit))
            }
        }
    }

    /// Decode callback data; unknown tokens yield `None`
    pub fn decode(data: &str) -> Option<Self> {
        if data == RELOAD_TOKEN {
            return Some(Action::ShowList);
        }
        data.strip_prefix(COURSE_PREFIX)
            .map(|id| Action::ShowCourse(id.to_string()))
    }
}

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char
pub fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_tokens() {
        assert_eq!(Action::decode("RELOAD"), Some(Action::ShowList));
        assert_eq!(Action::decode("CUR|c1"), Some(Action::ShowCourse("c1".into())));
        assert_eq!(Action::decode("CUR|"), Some(Action::ShowCourse(String::new())));
        assert_eq!(Action::decode("CUR|a|b"), Some(Action::ShowCourse("a|b".into())));
    }

    #[test]
    fn test_decode_unknown_tokens() {
        assert_eq!(Action::decode(""), None);
        assert_eq!(Action::decode("reload"), None);
        assert_eq!(Action::decode("edit_0"), None);
    }

    #[test]
    fn test_long_ids_are_truncated() {
        let id = "x".repeat(100);
        let action = Action::show_course(id.clone());
        let encoded = action.encode();
        assert_eq!(encoded.len(), MAX_CALLBACK_DATA_BYTES);
        assert_eq!(Action::decode(&encoded), Some(Action::ShowCourse("x".repeat(60))));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'ñ' is two bytes; 31 of them are 62 bytes
        let id = "ñ".repeat(31);
        let encoded = Action::show_course(id).encode();
        assert!(encoded.len() <= MAX_CALLBACK_DATA_BYTES);
        assert_eq!(encoded, format!("CUR|{}", "ñ".repeat(30)));
    }

    #[test]
    fn test_truncate_to_bytes() {
        assert_eq!(truncate_to_bytes("abc", 5), "abc");
        assert_eq!(truncate_to_bytes("abcdef", 3), "abc");
        assert_eq!(truncate_to_bytes("añb", 2), "a");
    }
}

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(16).collect()
}

/// Participant ids travel in every message; keep them short and plain.
pub fn sanitize_participant_id(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > 32 {
        return None;
    }
    let valid = trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    valid.then(|| trimmed.to_string())
}

pub fn is_supported_room(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "main"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_room_is_rejected() {
        assert!(!is_supported_room(Some("")));
        assert!(!is_supported_room(Some("   ")));
        assert!(!is_supported_room(Some("room-a")));
        assert!(is_supported_room(Some("main")));
        assert!(is_supported_room(Some(" MAIN ")));
        assert!(is_supported_room(None));
    }

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(""), "Player");
        assert_eq!(sanitize_name("   "), "Player");
        assert_eq!(sanitize_name(" Alice "), "Alice");
        assert_eq!(sanitize_name("12345678901234567890"), "1234567890123456");
    }

    #[test]
    fn participant_ids_are_restricted() {
        assert_eq!(sanitize_participant_id(" p_1 "), Some("p_1".to_string()));
        assert_eq!(sanitize_participant_id("guest-7"), Some("guest-7".to_string()));
        assert_eq!(sanitize_participant_id(""), None);
        assert_eq!(sanitize_participant_id("a b"), None);
        assert_eq!(sanitize_participant_id("<script>"), None);
        assert_eq!(sanitize_participant_id(&"x".repeat(33)), None);
    }
}

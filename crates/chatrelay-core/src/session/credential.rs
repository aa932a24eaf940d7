//! Caller-supplied bearer credential

/// Prefix every completion API key carries
pub const CREDENTIAL_PREFIX: &str = "sk-";

/// Bearer secret for the completion API.
///
/// Lives for one call only. `Debug` and `Display` print the masked form,
/// so the value cannot leak through logging by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw key; blank input counts as absent
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Format check only; the key is never verified against the API here
    pub fn has_valid_format(&self) -> bool {
        self.0.starts_with(CREDENTIAL_PREFIX)
    }

    /// Raw value, for building the authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `sk-***` followed by the last four characters
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        let head: String = chars[..3].iter().collect();
        format!("{}***{}", head, tail)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

impl std::fmt::Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("  \t").is_none());
    }

    #[test]
    fn test_format_check() {
        assert!(Credential::new("sk-abc123").unwrap().has_valid_format());
        assert!(!Credential::new("pk-abc123").unwrap().has_valid_format());
    }

    #[test]
    fn test_masking_never_prints_full_value() {
        let credential = Credential::new("sk-0123456789abcdef").unwrap();
        assert_eq!(credential.masked(), "sk-***cdef");
        assert_eq!(format!("{}", credential), "sk-***cdef");
        assert!(!format!("{:?}", credential).contains("0123456789"));
        assert_eq!(credential.expose(), "sk-0123456789abcdef");
    }

    #[test]
    fn test_short_credential_fully_masked() {
        assert_eq!(Credential::new("sk-1").unwrap().masked(), "***");
    }
}

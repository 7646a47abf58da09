/// How a booking code is pulled out of a free-text bank transfer memo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BookingCodeMatcher {
    /// The whole trimmed memo is the booking code.
    #[default]
    Literal,
    /// The first alphanumeric token starting with `prefix` is the booking code.
    PrefixedToken { prefix: String },
}

impl BookingCodeMatcher {
    pub fn from_prefix(prefix: Option<&str>) -> Self {
        match prefix.map(str::trim).filter(|prefix| !prefix.is_empty()) {
            Some(prefix) => BookingCodeMatcher::PrefixedToken {
                prefix: prefix.to_ascii_uppercase(),
            },
            None => BookingCodeMatcher::Literal,
        }
    }

    pub fn extract(&self, content: &str) -> Option<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }

        match self {
            BookingCodeMatcher::Literal => Some(trimmed.to_string()),
            BookingCodeMatcher::PrefixedToken { prefix } => trimmed
                .split(|c: char| !c.is_ascii_alphanumeric())
                .map(|token| token.to_ascii_uppercase())
                .find(|token| token.len() > prefix.len() && token.starts_with(prefix.as_str())),
        }
    }
}

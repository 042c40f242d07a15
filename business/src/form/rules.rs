//! Synchronous field rules.
//!
//! These are advisory: they catch obvious mistakes before a round trip but do not mirror the
//! backend's own validation.

/// A single check applied to a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-blank.
    Required,
    /// Contains `non-space@non-space.non-space` somewhere.
    Email,
    /// At least this many characters.
    MinLength(usize),
    /// A whole number greater than zero.
    PositiveInteger,
    /// Exactly one of the listed values.
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Returns the error message for `label`, or `None` when `value` passes.
    ///
    /// Blank values only fail `Required`; other rules let them through so a field reports
    /// "is required" rather than a format complaint.
    pub fn check(self, label: &str, value: &str) -> Option<String> {
        let blank = value.trim().is_empty();
        match self {
            Self::Required if blank => Some(format!("{label} is required")),
            Self::Required => None,
            _ if blank => None,
            Self::Email if !looks_like_email(value) => Some(format!("{label} is invalid")),
            Self::MinLength(min) if value.chars().count() < min => {
                Some(format!("{label} must be at least {min} characters"))
            }
            Self::PositiveInteger if !matches!(value.trim().parse::<u32>(), Ok(n) if n > 0) => {
                Some(format!("{label} must be a positive whole number"))
            }
            Self::OneOf(options) if !options.contains(&value.trim()) => {
                Some(format!("{label} must be one of: {}", options.join(", ")))
            }
            Self::Email | Self::MinLength(_) | Self::PositiveInteger | Self::OneOf(_) => None,
        }
    }
}

/// Same acceptance as the unanchored pattern `\S+@\S+\.\S+`.
pub fn looks_like_email(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    chars.iter().enumerate().any(|(at, &c)| {
        if c != '@' || at == 0 || chars[at - 1].is_whitespace() {
            return false;
        }
        let domain: Vec<char> = chars[at + 1..]
            .iter()
            .copied()
            .take_while(|c| !c.is_whitespace())
            .collect();
        // A dot with at least one character on each side, all within the same word.
        domain.len() >= 3
            && domain[1..domain.len() - 1].contains(&'.')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert_eq!(
            Rule::Required.check("Email", "  "),
            Some("Email is required".to_owned())
        );
        assert_eq!(Rule::Required.check("Email", "x"), None);
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("admin@example.com"));
        assert!(looks_like_email("a@b.c"));
        assert!(looks_like_email("x y@b.c"));
        assert!(looks_like_email("a@@b.c"));
        assert!(!looks_like_email("foo"));
        assert!(!looks_like_email("@b.c"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a@.c"));
        assert!(!looks_like_email("a@b .c"));
        assert!(!looks_like_email("a @b.c"));
    }

    #[test]
    fn test_email_rule_message() {
        assert_eq!(
            Rule::Email.check("Email", "foo"),
            Some("Email is invalid".to_owned())
        );
        assert_eq!(Rule::Email.check("Email", ""), None);
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert_eq!(
            Rule::MinLength(6).check("Password", "12345"),
            Some("Password must be at least 6 characters".to_owned())
        );
        assert_eq!(Rule::MinLength(6).check("Password", "123456"), None);
        assert_eq!(Rule::MinLength(3).check("Name", "éàü"), None);
    }

    #[test]
    fn test_positive_integer() {
        assert!(Rule::PositiveInteger.check("Age", "0").is_some());
        assert!(Rule::PositiveInteger.check("Age", "-3").is_some());
        assert!(Rule::PositiveInteger.check("Age", "4.5").is_some());
        assert_eq!(Rule::PositiveInteger.check("Age", " 12 "), None);
    }

    #[test]
    fn test_one_of() {
        let rule = Rule::OneOf(&["Male", "Female", "Other"]);
        assert_eq!(rule.check("Gender", "Female"), None);
        assert_eq!(
            rule.check("Gender", "female"),
            Some("Gender must be one of: Male, Female, Other".to_owned())
        );
    }
}

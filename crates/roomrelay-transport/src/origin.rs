//! Origin allow-list applied to incoming upgrade requests.

/// Which browser origins may open a connection.
///
/// Only requests that carry an `Origin` header are checked. Native clients
/// don't send one and are always let through; the allow-list exists to stop
/// other web pages from talking to the relay, not to authenticate anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Any origin is accepted.
    #[default]
    Any,
    /// Only these exact origins (e.g. `https://game.example.com`).
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Parses a `CLIENT_ORIGIN`-style value.
    ///
    /// `*` (or an empty string) means [`OriginPolicy::Any`]; anything else
    /// is a comma-separated list of origins. Trailing slashes are ignored.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "*" {
            return Self::Any;
        }
        let origins: Vec<String> = value
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::AllowList(origins)
        }
    }

    /// Returns `true` if a request with this `Origin` header may connect.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (Self::Any, _) | (_, None) => true,
            (Self::AllowList(list), Some(origin)) => {
                let origin = origin.trim_end_matches('/');
                list.iter().any(|allowed| allowed.eq_ignore_ascii_case(origin))
            }
        }
    }

    /// Returns `true` when every origin is accepted.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_star_is_any() {
        assert_eq!(OriginPolicy::parse("*"), OriginPolicy::Any);
        assert_eq!(OriginPolicy::parse("  "), OriginPolicy::Any);
    }

    #[test]
    fn test_parse_comma_list() {
        let policy =
            OriginPolicy::parse("https://a.example, https://b.example/");
        assert_eq!(
            policy,
            OriginPolicy::AllowList(vec![
                "https://a.example".into(),
                "https://b.example".into(),
            ])
        );
    }

    #[test]
    fn test_allows_listed_origin_only() {
        let policy = OriginPolicy::parse("https://game.example");
        assert!(policy.allows(Some("https://game.example")));
        assert!(policy.allows(Some("https://GAME.example/")));
        assert!(!policy.allows(Some("https://evil.example")));
    }

    #[test]
    fn test_allows_missing_origin() {
        let policy = OriginPolicy::parse("https://game.example");
        assert!(policy.allows(None));
    }
}

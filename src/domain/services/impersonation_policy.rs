//! # Impersonation Policy
//!
//! なりすまし前の入力検証

use crate::domain::error::ValidationError;

/// なりすまし対象の検証ポリシー
///
/// `allowed_domain` が未設定の場合は検証を行わない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpersonationPolicy {
    allowed_domain: Option<String>,
}

impl ImpersonationPolicy {
    pub fn new(allowed_domain: Option<String>) -> Self {
        Self {
            allowed_domain: allowed_domain.filter(|d| !d.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.allowed_domain.is_some()
    }

    /// メールアドレスとユーザー名を検証します。
    ///
    /// - メールアドレスは `@domain` か `.domain`（サブドメイン）で終わること
    /// - ユーザー名は英数字・`_`・`-` のみ
    pub fn validate(&self, email: &str, username: Option<&str>) -> Result<(), ValidationError> {
        let Some(domain) = &self.allowed_domain else {
            return Ok(());
        };

        let email_lower = email.to_ascii_lowercase();
        let domain_lower = domain.to_ascii_lowercase();
        let in_domain = email_lower.ends_with(&format!("@{}", domain_lower))
            || (email_lower.contains('@') && email_lower.ends_with(&format!(".{}", domain_lower)));
        if !in_domain {
            return Err(ValidationError::EmailDomain {
                email: email.to_string(),
                domain: domain.clone(),
            });
        }

        if let Some(username) = username {
            if !is_valid_username(username) {
                return Err(ValidationError::Username(username.to_string()));
            }
        }

        Ok(())
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_policy_accepts_anything() {
        let policy = ImpersonationPolicy::default();

        assert!(!policy.is_enabled());
        assert!(policy.validate("someone@elsewhere.org", Some("bad name!")).is_ok());
    }

    #[test]
    fn test_empty_domain_disables_policy() {
        assert!(!ImpersonationPolicy::new(Some(String::new())).is_enabled());
    }

    #[test]
    fn test_email_in_domain() {
        let policy = ImpersonationPolicy::new(Some("example.com".to_string()));

        assert!(policy.validate("analyst@example.com", None).is_ok());
        assert!(policy.validate("Analyst@EXAMPLE.com", None).is_ok());
        assert!(policy.validate("analyst@eu.example.com", None).is_ok());
    }

    #[test]
    fn test_email_outside_domain() {
        let policy = ImpersonationPolicy::new(Some("example.com".to_string()));

        for email in ["analyst@badexample.com", "analyst@example.org", "example.com"] {
            assert_eq!(
                policy.validate(email, None),
                Err(ValidationError::EmailDomain {
                    email: email.to_string(),
                    domain: "example.com".to_string(),
                }),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_username_characters() {
        let policy = ImpersonationPolicy::new(Some("example.com".to_string()));

        assert!(policy.validate("a@example.com", Some("data_team-01")).is_ok());
        assert!(policy.validate("a@example.com", Some("")).is_ok());
        assert_eq!(
            policy.validate("a@example.com", Some("drop table")),
            Err(ValidationError::Username("drop table".to_string()))
        );
    }
}

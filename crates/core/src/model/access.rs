use std::fmt;

/// Secret used when none is configured.
pub const DEFAULT_ADMIN_SECRET: &str = "admin123";

/// Who is using the app right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessLevel {
    #[default]
    Guest,
    Admin,
}

impl AccessLevel {
    #[must_use]
    pub fn from_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Guest }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Guest => f.write_str("guest"),
            AccessLevel::Admin => f.write_str("admin"),
        }
    }
}

/// Shared password for the admin gate.
///
/// The gate runs entirely on the local machine: the secret ships with the
/// binary or its environment and the unlocked flag sits in the local store,
/// so anyone with access to either can bypass it. Only suitable where there
/// is nothing worth protecting.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSecret(String);

impl AdminSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exact, case-sensitive comparison.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }
}

impl Default for AdminSecret {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_SECRET)
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_match_is_exact() {
        let secret = AdminSecret::default();
        assert!(secret.matches("admin123"));
        assert!(!secret.matches("Admin123"));
        assert!(!secret.matches("admin123 "));
        assert!(!secret.matches(""));
        assert_eq!(format!("{secret:?}"), "AdminSecret(..)");
    }

    #[test]
    fn access_level_from_flag() {
        assert_eq!(AccessLevel::default(), AccessLevel::Guest);
        assert!(AccessLevel::from_flag(true).is_admin());
        assert!(!AccessLevel::from_flag(false).is_admin());
    }
}

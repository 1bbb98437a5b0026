use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Token granting every permission.
pub const WILDCARD: &str = "*";

/// Suffix marking a per-module wildcard (`"sales.*"`).
pub const MODULE_WILDCARD_SUFFIX: &str = ".*";

/// Permission identifier.
///
/// Permissions are dot-separated `<module>.<action>` strings (e.g.
/// `"orders.write"`). Two wildcard forms are understood by the evaluator:
/// `"*"` grants everything and `"<module>.*"` grants every action of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == WILDCARD
    }

    /// Module named by a `"<module>.*"` grant, if this is one.
    pub fn module_wildcard(&self) -> Option<&str> {
        self.as_str().strip_suffix(MODULE_WILDCARD_SUFFIX)
    }

    /// Module part of `"<module>.<action>"`.
    pub fn module(&self) -> Option<&str> {
        self.split().map(|(module, _)| module)
    }

    /// Action part of `"<module>.<action>"`.
    pub fn action(&self) -> Option<&str> {
        self.split().map(|(_, action)| action)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let (module, action) = self.as_str().split_once('.')?;
        if module.is_empty() || action.is_empty() {
            None
        } else {
            Some((module, action))
        }
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_module_and_action() {
        let p = Permission::from_static("inventory.transfer");
        assert_eq!(p.module(), Some("inventory"));
        assert_eq!(p.action(), Some("transfer"));
        assert_eq!(p.module_wildcard(), None);
    }

    #[test]
    fn recognizes_wildcards() {
        assert!(Permission::from_static("*").is_wildcard());
        assert_eq!(Permission::from_static("sales.*").module_wildcard(), Some("sales"));
        assert!(!Permission::from_static("sales.*").is_wildcard());
    }

    #[test]
    fn malformed_has_no_module() {
        assert_eq!(Permission::new("dashboard").module(), None);
        assert_eq!(Permission::new(".read").module(), None);
        assert_eq!(Permission::new("orders.").action(), None);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&Permission::from_static("pos.access")).unwrap();
        assert_eq!(json, "\"pos.access\"");
    }
}

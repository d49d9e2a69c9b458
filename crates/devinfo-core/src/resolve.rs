use crate::{AccessorResult, AccessorUnavailable, AttributeKey};

/// Outcome of resolving a single attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Fallback {
        value: String,
        cause: AccessorUnavailable,
    },
}

impl Resolution {
    pub fn value(&self) -> &str {
        match self {
            Resolution::Resolved(value) => value,
            Resolution::Fallback { value, .. } => value,
        }
    }

    pub fn cause(&self) -> Option<&AccessorUnavailable> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Fallback { cause, .. } => Some(cause),
        }
    }
}

/// Applies `key`'s fallback policy to an accessor result.
pub fn resolve(key: AttributeKey, result: AccessorResult<String>) -> Resolution {
    match result {
        Ok(value) => Resolution::Resolved(value),
        Err(cause) => Resolution::Fallback {
            value: key.fallback().to_string(),
            cause,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_kept_verbatim() {
        let resolution = resolve(AttributeKey::Locale, Ok(" en_US ".into()));
        assert_eq!(resolution, Resolution::Resolved(" en_US ".into()));
        assert!(resolution.cause().is_none());
    }

    #[test]
    fn failure_uses_key_fallback() {
        let resolution = resolve(
            AttributeKey::AppVersion,
            Err(AccessorUnavailable::new("package not found")),
        );
        assert!(matches!(resolution, Resolution::Fallback { .. }));
        assert_eq!(resolution.value(), "unknown");
        assert_eq!(resolution.cause().unwrap().reason(), "package not found");
    }
}

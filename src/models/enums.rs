use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate a closed wire enum with `as_str` + case-insensitive
/// `FromStr` (plus optional aliases) and string-based serde.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal $(| $alias:literal)*),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_uppercase();
                $(
                    if upper == $s $(|| upper == $alias)* {
                        return Ok(Self::$variant);
                    }
                )+
                Err(ModelError::InvalidEnum {
                    field: stringify!($name),
                    value: s.into(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(AccountStatus {
    Pending => "PENDING",
    Active => "ACTIVE",
    Suspended => "SUSPENDED",
});

str_enum!(CertificateStatus {
    Active => "ACTIVE",
    Expired => "EXPIRED",
    Revoked => "REVOKED",
});

str_enum!(SenderType {
    Patient => "PATIENT",
    Provider => "PROVIDER" | "DOCTOR",
});

impl AccountStatus {
    /// Only active accounts may book, read notifications or history.
    pub fn unlocks_features(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn account_status_round_trip() {
        for (variant, s) in [
            (AccountStatus::Pending, "PENDING"),
            (AccountStatus::Active, "ACTIVE"),
            (AccountStatus::Suspended, "SUSPENDED"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AccountStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(AccountStatus::from_str("active").unwrap(), AccountStatus::Active);
        assert_eq!(AccountStatus::from_str(" Pending ").unwrap(), AccountStatus::Pending);
        assert_eq!(CertificateStatus::from_str("revoked").unwrap(), CertificateStatus::Revoked);
    }

    #[test]
    fn aliases_resolve_to_variant() {
        assert_eq!(SenderType::from_str("doctor").unwrap(), SenderType::Provider);
    }

    #[test]
    fn invalid_enum_returns_error() {
        let err = AccountStatus::from_str("BANNED").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidEnum {
                field: "AccountStatus",
                value: "BANNED".into()
            }
        );
        assert!(SenderType::from_str("").is_err());
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&AccountStatus::Suspended).unwrap();
        assert_eq!(json, "\"SUSPENDED\"");
        let parsed: AccountStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(parsed, AccountStatus::Active);
        assert!(serde_json::from_str::<AccountStatus>("\"nope\"").is_err());
    }

    #[test]
    fn only_active_unlocks_features() {
        assert!(AccountStatus::Active.unlocks_features());
        assert!(!AccountStatus::Pending.unlocks_features());
        assert!(!AccountStatus::Suspended.unlocks_features());
    }
}

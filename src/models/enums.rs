use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(CaseStatus {
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
    Corrected => "corrected",
});

impl CaseStatus {
    /// A terminal status admits no further review transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

str_enum!(Severity {
    Mild => "mild",
    Moderate => "moderate",
    Critical => "critical",
    Cv => "CV",
});

str_enum!(NotificationType {
    Approved => "approved",
    Rejected => "rejected",
    Corrected => "corrected",
});

str_enum!(ApprovalType {
    Online => "online",
    Offline => "offline",
});

str_enum!(PrescriptionStatus {
    Pending => "pending",
    Partial => "partial",
    Dispensed => "dispensed",
});

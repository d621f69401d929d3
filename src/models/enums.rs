use crate::models::ModelError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same string forms as the wire/storage format.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
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
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(FunctionalLevel {
    Independent => "independent",
    MinimalAssistance => "minimal-assistance",
    ModerateAssistance => "moderate-assistance",
    MaximumAssistance => "maximum-assistance",
    TotalAssistance => "total-assistance",
});

str_enum!(PlanStatus {
    Active => "active",
    Completed => "completed",
    Draft => "draft",
});

str_enum!(SessionFrequency {
    Daily => "daily",
    ThreeTimesWeekly => "3x-weekly",
    TwiceWeekly => "2x-weekly",
    Weekly => "weekly",
});

impl FunctionalLevel {
    /// Human-readable label ("moderate-assistance" → "moderate assistance").
    pub fn label(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

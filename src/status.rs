use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(TenderStatus, "tender status", {
    Created => "CREATED",
    Published => "PUBLISHED",
    Closed => "CLOSED",
});

string_enum!(BidStatus, "bid status", {
    Created => "CREATED",
    Published => "PUBLISHED",
    Canceled => "CANCELED",
});

string_enum!(OrganizationType, "organization type", {
    Ie => "IE",
    Llc => "LLC",
    Jsc => "JSC",
});

string_enum!(Decision, "decision", {
    Approve => "approve",
    Reject => "reject",
});

impl BidStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Canceled)
    }
}

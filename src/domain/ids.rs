//! Identifier value types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::support::DomainError;

/// Correlates every callback, log line and result produced by one
/// logical operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTrackingId {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl EventTrackingId {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }
}

impl Default for EventTrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventTrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

macro_rules! string_ids {
    ($($(#[$meta:meta])* $name:ident => $entity:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(try_from = "String", into = "String")]
            pub struct $name(String);

            impl $name {
                /// Parse an identifier, rejecting empty or blank input.
                pub fn parse(s: impl AsRef<str>) -> Result<Self, DomainError> {
                    let trimmed = s.as_ref().trim();
                    if trimmed.is_empty() {
                        return Err(DomainError::invalid_argument(
                            $entity,
                            "identifier must not be empty",
                        ));
                    }
                    Ok(Self(trimmed.to_string()))
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl FromStr for $name {
                type Err = DomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse(s)
                }
            }

            impl TryFrom<String> for $name {
                type Error = DomainError;

                fn try_from(s: String) -> Result<Self, Self::Error> {
                    Self::parse(s)
                }
            }

            impl From<$name> for String {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

string_ids! {
    /// Identifier of a charging station operator, e.g. `DE*GEF`
    ChargingStationOperatorId => "charging_station_operator_id";
    /// Identifier of a charging station, e.g. `DE*GEF*S1234`
    ChargingStationId => "charging_station_id";
    /// Identifier of a charging station group
    ChargingStationGroupId => "charging_station_group_id";
}

//! Status enumerations of the WWCP entity hierarchy
//!
//! Every entity carries an operational status and an administrative
//! status. All of them share the same shape, so they are declared through
//! [`status_types!`] instead of one hand-written enum per entity.

/// Marker for values that can be tracked by a
/// [`StatusSchedule`](super::StatusSchedule).
///
/// `Default` must be the "unknown" sentinel reported for an empty history.
pub trait StatusType:
    Clone + PartialEq + Eq + PartialOrd + Ord + std::fmt::Debug + std::fmt::Display + Default + Send + Sync + 'static
{
}

impl<T> StatusType for T where
    T: Clone + PartialEq + Eq + PartialOrd + Ord + std::fmt::Debug + std::fmt::Display + Default + Send + Sync + 'static
{
}

/// Declares a status enum with `Unknown` as default, `as_str`/`FromStr`
/// over the variant names and serde string representation.
#[macro_export]
macro_rules! status_types {
    ($($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? })+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
                     ::serde::Serialize, ::serde::Deserialize)]
            pub enum $name {
                #[default]
                Unknown,
                $($variant,)+
            }

            impl $name {
                pub fn as_str(&self) -> &'static str {
                    match self {
                        Self::Unknown => "Unknown",
                        $(Self::$variant => stringify!($variant),)+
                    }
                }
            }

            impl ::std::fmt::Display for $name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl ::std::str::FromStr for $name {
                type Err = $crate::support::DomainError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    match s.trim() {
                        "Unknown" => Ok(Self::Unknown),
                        $(stringify!($variant) => Ok(Self::$variant),)+
                        other => Err($crate::support::DomainError::invalid_argument(
                            stringify!($name),
                            format!("unknown status '{}'", other),
                        )),
                    }
                }
            }
        )+
    };
}

status_types! {
    /// Operational status of an EVSE
    EvseStatusTypes {
        Available,
        Reserved,
        Charging,
        Faulted,
        Offline,
        OutOfService,
    }

    /// Administrative status of an EVSE
    EvseAdminStatusTypes {
        Operational,
        InternalUse,
        OutOfService,
        Blocked,
    }

    /// Operational status of a charging station
    ChargingStationStatusTypes {
        Available,
        PartiallyAvailable,
        Charging,
        Faulted,
        Offline,
        OutOfService,
    }

    /// Administrative status of a charging station
    ChargingStationAdminStatusTypes {
        Operational,
        InternalUse,
        OutOfService,
        Blocked,
    }

    /// Operational status of a charging station group
    ChargingStationGroupStatusTypes {
        Available,
        PartiallyAvailable,
        Faulted,
        Offline,
    }

    /// Administrative status of a charging station group
    ChargingStationGroupAdminStatusTypes {
        Operational,
        InternalUse,
        OutOfService,
    }

    /// Administrative status of an energy meter
    EnergyMeterAdminStatusTypes {
        Operational,
        OutOfService,
        Tampered,
    }

    /// Operational status of a roaming network
    RoamingNetworkStatusTypes {
        Available,
        Degraded,
        Offline,
    }

    /// Administrative status of a roaming network
    RoamingNetworkAdminStatusTypes {
        Operational,
        OutOfService,
    }
}

impl ChargingStationGroupAdminStatusTypes {
    /// Whether members of the group may be added or removed
    pub fn accepts_changes(&self) -> bool {
        matches!(self, Self::Operational | Self::InternalUse | Self::Unknown)
    }
}

impl From<ChargingStationGroupAdminStatusTypes> for ChargingStationAdminStatusTypes {
    fn from(status: ChargingStationGroupAdminStatusTypes) -> Self {
        match status {
            ChargingStationGroupAdminStatusTypes::Unknown => Self::Unknown,
            ChargingStationGroupAdminStatusTypes::Operational => Self::Operational,
            ChargingStationGroupAdminStatusTypes::InternalUse => Self::InternalUse,
            ChargingStationGroupAdminStatusTypes::OutOfService => Self::OutOfService,
        }
    }
}

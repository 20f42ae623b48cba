use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::RiderError;

// ============================================================================
// Rider Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Motorcycle,
    Bicycle,
    Car,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderStatus {
    Active,
    Inactive,
}

/// Registration input, before any identity has been issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderProfile {
    pub full_name: String,
    pub id_number: String,
    pub phone: String,
    pub email: String,
    pub vehicle_kind: VehicleKind,
    pub plate_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub full_name: String,
    pub id_number: String,
    pub phone: String,
    pub email: String,
    pub vehicle_kind: VehicleKind,
    pub plate_number: Option<String>,
    pub status: RiderStatus,
    pub created_at: DateTime<Utc>,
}

impl Rider {
    /// Register a new rider from a profile.
    ///
    /// Motorized vehicles must carry a plate number; bicycles never do, so
    /// any plate submitted with one is dropped rather than stored.
    pub fn register(profile: RiderProfile) -> Result<Self, RiderError> {
        let plate_number = match profile.vehicle_kind {
            VehicleKind::Bicycle => None,
            kind => match profile.plate_number {
                Some(plate) if !plate.trim().is_empty() => Some(plate),
                _ => return Err(RiderError::PlateRequired(kind)),
            },
        };

        Ok(Self {
            id: Uuid::new_v4(),
            full_name: profile.full_name,
            id_number: profile.id_number,
            phone: profile.phone,
            email: profile.email,
            vehicle_kind: profile.vehicle_kind,
            plate_number,
            status: RiderStatus::Active,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(vehicle_kind: VehicleKind, plate: Option<&str>) -> RiderProfile {
        RiderProfile {
            full_name: "Ana Flores".to_string(),
            id_number: "0801-1990-01234".to_string(),
            phone: "9999-0000".to_string(),
            email: "ana@example.com".to_string(),
            vehicle_kind,
            plate_number: plate.map(str::to_string),
        }
    }

    #[test]
    fn motorcycle_requires_a_plate() {
        let err = Rider::register(profile(VehicleKind::Motorcycle, None)).unwrap_err();
        assert!(matches!(err, RiderError::PlateRequired(VehicleKind::Motorcycle)));
    }

    #[test]
    fn blank_plate_counts_as_missing() {
        let err = Rider::register(profile(VehicleKind::Car, Some("  "))).unwrap_err();
        assert!(matches!(err, RiderError::PlateRequired(VehicleKind::Car)));
    }

    #[test]
    fn bicycle_never_stores_a_plate() {
        let rider = Rider::register(profile(VehicleKind::Bicycle, Some("HAB-1234"))).unwrap();
        assert_eq!(rider.plate_number, None);
        assert_eq!(rider.status, RiderStatus::Active);
    }

    #[test]
    fn car_with_plate_registers_active() {
        let rider = Rider::register(profile(VehicleKind::Car, Some("HAB-1234"))).unwrap();
        assert_eq!(rider.plate_number.as_deref(), Some("HAB-1234"));
        assert_eq!(rider.status, RiderStatus::Active);
    }
}

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::rider::{Rider, RiderProfile};
use crate::store::RiderStore;

use super::errors::ServiceError;

// ============================================================================
// Rider Service - registration and roster queries
// ============================================================================

pub struct RiderService {
    store: Arc<dyn RiderStore>,
}

impl RiderService {
    pub fn new(store: Arc<dyn RiderStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, profile: RiderProfile) -> Result<Rider, ServiceError> {
        let rider = Rider::register(profile)?;
        self.store.insert_rider(&rider).await?;

        tracing::info!(
            rider_id = %rider.id,
            rider_name = %rider.full_name,
            vehicle = ?rider.vehicle_kind,
            "rider registered"
        );
        Ok(rider)
    }

    pub async fn get(&self, rider_id: Uuid) -> Result<Rider, ServiceError> {
        Ok(self.store.fetch_rider(rider_id).await?)
    }

    pub async fn list(&self) -> Result<Vec<Rider>, ServiceError> {
        Ok(self.store.list_riders().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rider::VehicleKind;
    use crate::service::errors::ErrorKind;
    use crate::store::MemoryStore;

    fn profile(vehicle_kind: VehicleKind, plate: Option<&str>) -> RiderProfile {
        RiderProfile {
            full_name: "Carlos Mejía".to_string(),
            id_number: "0801-1985-09876".to_string(),
            phone: "8888-1111".to_string(),
            email: "carlos@example.com".to_string(),
            vehicle_kind,
            plate_number: plate.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn registration_persists_and_lists() {
        let store = Arc::new(MemoryStore::new());
        let service = RiderService::new(store);

        let rider = service
            .register(profile(VehicleKind::Car, Some("HAB-4321")))
            .await
            .unwrap();

        let roster = service.list().await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, rider.id);
    }

    #[tokio::test]
    async fn plateless_motorcycle_is_a_validation_failure() {
        let store = Arc::new(MemoryStore::new());
        let service = RiderService::new(store);

        let err = service
            .register(profile(VehicleKind::Motorcycle, None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(service.list().await.unwrap().is_empty());
    }
}

//! Doctor directory lookup.

use async_trait::async_trait;

use hms_core::db::DatabaseError;

use crate::model::Doctor;
use crate::storage::BookingDatabase;

/// Read-only lookup of doctors available for booking.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_active(&self, id: i64) -> Result<Option<Doctor>, DatabaseError>;

    async fn list_active(&self) -> Result<Vec<Doctor>, DatabaseError>;
}

#[async_trait]
impl DoctorDirectory for BookingDatabase {
    async fn find_active(&self, id: i64) -> Result<Option<Doctor>, DatabaseError> {
        self.find_active_doctor(id).await
    }

    async fn list_active(&self) -> Result<Vec<Doctor>, DatabaseError> {
        self.list_active_doctors().await
    }
}

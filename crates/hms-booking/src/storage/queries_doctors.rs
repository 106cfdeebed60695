//! Doctor directory queries.

use hms_core::db::{DatabaseError, unix_timestamp};
use hms_core::schedule::Specialist;

use super::db::BookingDatabase;
use super::models::DoctorRow;
use crate::model::Doctor;

impl BookingDatabase {
    /// Add a doctor to the directory. New doctors are active.
    pub async fn create_doctor(
        &self,
        name: &str,
        specialist: Specialist,
    ) -> Result<Doctor, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO doctors (name, specialist, is_active, created_at) VALUES (?, ?, 1, ?)",
        )
        .bind(name)
        .bind(specialist.as_str())
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        let id = result.last_insert_rowid();
        self.get_doctor(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Doctor {id}")))
    }

    /// Get a doctor by ID, active or not.
    pub async fn get_doctor(&self, id: i64) -> Result<Option<Doctor>, DatabaseError> {
        sqlx::query_as::<_, DoctorRow>("SELECT * FROM doctors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(Doctor::try_from)
            .transpose()
    }

    /// Get an active doctor by ID.
    pub async fn find_active_doctor(&self, id: i64) -> Result<Option<Doctor>, DatabaseError> {
        sqlx::query_as::<_, DoctorRow>("SELECT * FROM doctors WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(Doctor::try_from)
            .transpose()
    }

    /// List active doctors ordered by name.
    pub async fn list_active_doctors(&self) -> Result<Vec<Doctor>, DatabaseError> {
        sqlx::query_as::<_, DoctorRow>("SELECT * FROM doctors WHERE is_active = 1 ORDER BY name")
            .fetch_all(self.pool())
            .await?
            .into_iter()
            .map(Doctor::try_from)
            .collect()
    }

    /// Activate or deactivate a doctor. Returns `false` for unknown IDs.
    pub async fn set_doctor_active(&self, id: i64, active: bool) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE doctors SET is_active = ? WHERE id = ?")
            .bind(i64::from(active))
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

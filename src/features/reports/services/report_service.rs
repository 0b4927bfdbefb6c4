use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{CreateReport, Report, UpdateReport};
use crate::modules::storage::{PhotoStore, PhotoUpload};

const REPORT_COLUMNS: &str = r#"
    id, cedula,
    categoria AS category_id,
    tipo_falla AS fault_id,
    fallas_otros AS other_fault,
    sede AS site_id,
    foto_path AS photo_path,
    descripcion AS description,
    fecha_reporte AS reported_at
"#;

/// Service for report operations against the reports datastore
pub struct ReportService {
    pool: PgPool,
    photos: Arc<PhotoStore>,
}

impl ReportService {
    pub fn new(pool: PgPool, photos: Arc<PhotoStore>) -> Self {
        Self { pool, photos }
    }

    /// Insert a new report row
    pub async fn create(&self, data: &CreateReport) -> Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reportes
                (cedula, categoria, tipo_falla, fallas_otros, sede, foto_path, descripcion)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(&data.cedula)
            .bind(data.category_id)
            .bind(data.fault_id)
            .bind(&data.other_fault)
            .bind(data.site_id)
            .bind(&data.photo_path)
            .bind(&data.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created report {} for cedula {}", report.id, report.cedula);
        Ok(report)
    }

    /// Store the photo (when it is an allowed image) and insert the report.
    ///
    /// A disallowed photo is dropped and the report is stored without one.
    /// If the insert fails the freshly written photo is removed again.
    pub async fn submit(&self, mut data: CreateReport, photo: Option<PhotoUpload>) -> Result<Report> {
        if let Some(photo) = photo {
            data.photo_path = self
                .photos
                .save(&data.cedula, &photo.filename, &photo.data)
                .await?;
        }

        match self.create(&data).await {
            Ok(report) => Ok(report),
            Err(e) => {
                self.photos.discard(data.photo_path.as_deref()).await;
                Err(e)
            }
        }
    }

    /// Reports of one citizen, newest first
    pub async fn list_by_cedula(&self, cedula: &str) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reportes WHERE cedula = $1 ORDER BY fecha_reporte DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(cedula)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports for cedula {}: {:?}", cedula, e);
                AppError::Database(e)
            })
    }

    /// Every report, newest first
    pub async fn list_all(&self) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reportes ORDER BY fecha_reporte DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn find(&self, id: i32) -> Result<Option<Report>> {
        let sql = format!("SELECT {} FROM reportes WHERE id = $1", REPORT_COLUMNS);

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    /// Overwrite the editable fields of a report
    pub async fn update(&self, id: i32, data: &UpdateReport) -> Result<Report> {
        let sql = format!(
            r#"
            UPDATE reportes
            SET tipo_falla = $1, sede = $2, descripcion = $3, foto_path = $4
            WHERE id = $5
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(data.fault_id)
            .bind(data.site_id)
            .bind(&data.description)
            .bind(&data.photo_path)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Updated report {}", id);
        Ok(report)
    }

    /// Apply an edit, replacing the photo when a new allowed image is given.
    ///
    /// The previous photo is removed only after the row points at the new one.
    /// If the update fails the newly written photo is removed instead.
    pub async fn edit(
        &self,
        existing: &Report,
        fault_id: Option<i32>,
        site_id: Option<i32>,
        description: Option<String>,
        photo: Option<PhotoUpload>,
    ) -> Result<Report> {
        let new_photo = match photo {
            Some(photo) => {
                self.photos
                    .save(&existing.cedula, &photo.filename, &photo.data)
                    .await?
            }
            None => None,
        };

        let changes = UpdateReport {
            fault_id,
            site_id,
            description,
            photo_path: new_photo.clone().or_else(|| existing.photo_path.clone()),
        };
        let updated = match self.update(existing.id, &changes).await {
            Ok(updated) => updated,
            Err(e) => {
                if new_photo != existing.photo_path {
                    self.photos.discard(new_photo.as_deref()).await;
                }
                return Err(e);
            }
        };

        if let (Some(new), Some(old)) = (new_photo.as_deref(), existing.photo_path.as_deref()) {
            // Same citizen and filename means the upload already overwrote it
            if new != old {
                self.photos.discard(Some(old)).await;
            }
        }

        Ok(updated)
    }

    /// Delete a report and then its photo. Returns the deleted row, or
    /// `None` when no report has this id.
    ///
    /// Email records referencing the report are kept.
    pub async fn delete(&self, id: i32) -> Result<Option<Report>> {
        let sql = format!("DELETE FROM reportes WHERE id = $1 RETURNING {}", REPORT_COLUMNS);

        let deleted = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if let Some(report) = &deleted {
            tracing::info!("Deleted report {}", report.id);
            self.photos.discard(report.photo_path.as_deref()).await;
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_datastores, test_config};
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    fn temp_photos() -> (Arc<PhotoStore>, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("reports-{}", uuid::Uuid::new_v4()));
        (Arc::new(PhotoStore::new(&dir)), dir)
    }

    fn new_report(cedula: &str) -> CreateReport {
        CreateReport {
            cedula: cedula.to_string(),
            category_id: Some(1),
            fault_id: Some(3),
            other_fault: None,
            site_id: Some(2),
            photo_path: None,
            description: Some(Sentence(2..6).fake()),
        }
    }

    fn offline_service() -> (ReportService, std::path::PathBuf) {
        let config = test_config();
        let (photos, dir) = temp_photos();
        (ReportService::new(lazy_datastores(&config).reports, photos), dir)
    }

    fn stored_report(cedula: &str, photo_path: Option<&str>) -> Report {
        Report {
            id: 41,
            cedula: cedula.to_string(),
            category_id: Some(1),
            fault_id: Some(3),
            other_fault: None,
            site_id: Some(2),
            photo_path: photo_path.map(str::to_string),
            description: None,
            reported_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_submit_failure_leaves_no_photo_behind() {
        let (service, dir) = offline_service();

        let result = service
            .submit(
                new_report("V-7"),
                Some(PhotoUpload {
                    filename: "fuga.png".to_string(),
                    data: b"png".to_vec(),
                }),
            )
            .await;

        assert!(result.is_err());
        assert!(!dir.join("uploads/V-7_fuga.png").exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_submit_with_disallowed_photo_writes_nothing() {
        let (service, dir) = offline_service();

        let result = service
            .submit(
                new_report("V-8"),
                Some(PhotoUpload {
                    filename: "macro.exe".to_string(),
                    data: b"MZ".to_vec(),
                }),
            )
            .await;

        // The insert still runs (and fails offline) with the photo dropped
        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(!dir.join("uploads").exists());
    }

    #[tokio::test]
    async fn test_failed_edit_removes_new_photo_and_keeps_old() {
        let (service, dir) = offline_service();
        std::fs::create_dir_all(dir.join("uploads")).unwrap();
        std::fs::write(dir.join("uploads/V-9_antes.png"), b"old").unwrap();
        let existing = stored_report("V-9", Some("uploads/V-9_antes.png"));

        let result = service
            .edit(
                &existing,
                Some(4),
                Some(2),
                None,
                Some(PhotoUpload {
                    filename: "nueva.png".to_string(),
                    data: b"new".to_vec(),
                }),
            )
            .await;

        assert!(result.is_err());
        assert!(!dir.join("uploads/V-9_nueva.png").exists());
        assert!(dir.join("uploads/V-9_antes.png").exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[sqlx::test(migrations = "./migrations/reports")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_and_list_by_cedula(pool: PgPool) {
        let (photos, _dir) = temp_photos();
        let service = ReportService::new(pool, photos);

        let first = service.create(&new_report("V-1")).await.unwrap();
        let second = service.create(&new_report("V-1")).await.unwrap();
        service.create(&new_report("V-2")).await.unwrap();

        let mine = service.list_by_cedula("V-1").await.unwrap();
        let ids: Vec<i32> = mine.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));
        assert!(mine[0].reported_at >= mine[1].reported_at);
    }

    #[sqlx::test(migrations = "./migrations/reports")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_disallowed_photo_is_dropped_not_rejected(pool: PgPool) {
        let (photos, dir) = temp_photos();
        let service = ReportService::new(pool, photos);

        let report = service
            .submit(
                new_report("V-3"),
                Some(PhotoUpload {
                    filename: "virus.exe".to_string(),
                    data: b"MZ".to_vec(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(report.photo_path, None);
        assert!(!dir.join("uploads").exists());
    }

    #[sqlx::test(migrations = "./migrations/reports")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delete_removes_photo(pool: PgPool) {
        let (photos, dir) = temp_photos();
        let service = ReportService::new(pool, photos);

        let report = service
            .submit(
                new_report("V-4"),
                Some(PhotoUpload {
                    filename: "grieta.png".to_string(),
                    data: b"png".to_vec(),
                }),
            )
            .await
            .unwrap();
        let stored = report.photo_path.clone().unwrap();
        assert!(dir.join(&stored).exists());

        let deleted = service.delete(report.id).await.unwrap();
        assert_eq!(deleted.map(|r| r.id), Some(report.id));
        assert!(!dir.join(&stored).exists());
        assert!(service.find(report.id).await.unwrap().is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[sqlx::test(migrations = "./migrations/reports")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delete_without_photo_and_unknown_id(pool: PgPool) {
        let (photos, dir) = temp_photos();
        let service = ReportService::new(pool, photos);

        let report = service.create(&new_report("V-5")).await.unwrap();
        assert!(service.delete(report.id).await.unwrap().is_some());
        assert!(!dir.exists());

        assert!(service.delete(report.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations/reports")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_edit_replaces_photo(pool: PgPool) {
        let (photos, dir) = temp_photos();
        let service = ReportService::new(pool, photos);

        let report = service
            .submit(
                new_report("V-6"),
                Some(PhotoUpload {
                    filename: "antes.jpg".to_string(),
                    data: b"old".to_vec(),
                }),
            )
            .await
            .unwrap();
        let old = report.photo_path.clone().unwrap();

        let updated = service
            .edit(
                &report,
                Some(9),
                None,
                Some("Actualizado".to_string()),
                Some(PhotoUpload {
                    filename: "despues.jpg".to_string(),
                    data: b"new".to_vec(),
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated.fault_id, Some(9));
        assert_eq!(updated.site_id, None);
        assert_eq!(updated.category_id, report.category_id);
        assert_eq!(updated.photo_path.as_deref(), Some("uploads/V-6_despues.jpg"));
        assert!(!dir.join(&old).exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}

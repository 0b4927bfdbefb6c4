use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::core::templates::TemplateEngine;
use crate::features::catalog::services::CatalogService;
use crate::features::notifications::dtos::SendEmailRequestDto;
use crate::features::notifications::models::{EmailFilter, NewOutboundEmail, OutboundEmail};
use crate::features::notifications::services::{confirmation_url, NotificationContent};
use crate::modules::mail::{InlineImage, Mailer, OutboundMessage};
use crate::modules::storage::PhotoStore;
use crate::shared::constants::{INLINE_PHOTO_CID, LABEL_NOT_FOUND, NOTIFICATION_SUBJECT};

const EMAIL_COLUMNS: &str = r#"
    id,
    reporte_id AS report_id,
    cedula,
    destinatario AS recipient,
    asunto AS subject,
    mensaje AS body,
    foto_path AS photo_path,
    estatus_confirmacion AS confirmed,
    estatus_solucion AS resolved,
    fecha_envio AS sent_at
"#;

// Each flag is only ever set, and only by its own statement
const CONFIRM_SQL: &str = "UPDATE correos_enviados SET estatus_confirmacion = TRUE WHERE id = $1";
const RESOLVE_SQL: &str = "UPDATE correos_enviados SET estatus_solucion = TRUE WHERE id = $1";

/// Composes, records and sends report notifications, and tracks their
/// confirmation and resolution flags
pub struct NotificationService {
    pool: PgPool,
    catalog: Arc<CatalogService>,
    photos: Arc<PhotoStore>,
    templates: Arc<TemplateEngine>,
    mailer: Arc<dyn Mailer>,
    recipient: String,
    public_base_url: String,
}

impl NotificationService {
    pub fn new(
        pool: PgPool,
        catalog: Arc<CatalogService>,
        photos: Arc<PhotoStore>,
        templates: Arc<TemplateEngine>,
        mailer: Arc<dyn Mailer>,
        recipient: String,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            catalog,
            photos,
            templates,
            mailer,
            recipient,
            public_base_url,
        }
    }

    /// Record and send the notification for a report.
    ///
    /// Returns the audit record id. A record that cannot be stored does not
    /// stop the email, which is then sent without a confirmation link. A
    /// delivery failure leaves the record pending.
    pub async fn notify_report(&self, request: SendEmailRequestDto) -> Result<Option<i32>> {
        let labels = self.catalog.label_maps().await;

        let record = NewOutboundEmail {
            report_id: request.reporte_id,
            cedula: request.cedula.clone(),
            recipient: self.recipient.clone(),
            subject: NOTIFICATION_SUBJECT.to_string(),
            body: request.descripcion.clone(),
            photo_path: request.foto_path.clone(),
        };
        let correo_id = match self.record(&record).await {
            Ok(email) => Some(email.id),
            Err(e) => {
                tracing::error!("Notification for report {:?} not recorded: {}", request.reporte_id, e);
                None
            }
        };

        let inline_image = match request.foto_path.as_deref() {
            Some(path) => self.inline_photo(path).await,
            None => None,
        };

        let content = NotificationContent {
            cedula: request.cedula.unwrap_or_default(),
            categoria: labels.category(request.categoria_id).name_or(LABEL_NOT_FOUND),
            falla: labels.fault(request.falla_id).name_or(LABEL_NOT_FOUND),
            sede: labels.site(request.sede_id).name_or(LABEL_NOT_FOUND),
            descripcion: request.descripcion.unwrap_or_default(),
            foto_cid: None,
            confirmacion_url: correo_id.map(|id| confirmation_url(&self.public_base_url, id)),
        }
        .with_inline_photo(inline_image.is_some());

        let html = content.render(&self.templates)?;

        self.mailer
            .send(OutboundMessage {
                to: self.recipient.clone(),
                subject: NOTIFICATION_SUBJECT.to_string(),
                html,
                inline_image,
            })
            .await?;

        tracing::info!(
            "Notification sent for report {:?} (correo_id: {:?})",
            request.reporte_id,
            correo_id
        );
        Ok(correo_id)
    }

    async fn inline_photo(&self, stored_path: &str) -> Option<InlineImage> {
        match self.photos.read(stored_path).await {
            Ok(data) => Some(InlineImage {
                content_id: INLINE_PHOTO_CID.to_string(),
                content_type: PhotoStore::content_type_for(stored_path).to_string(),
                data,
            }),
            Err(e) => {
                tracing::warn!("Sending notification without photo {}: {}", stored_path, e);
                None
            }
        }
    }

    /// Persist a new record in the pending state
    pub async fn record(&self, data: &NewOutboundEmail) -> Result<OutboundEmail> {
        let sql = format!(
            r#"
            INSERT INTO correos_enviados
                (reporte_id, cedula, destinatario, asunto, mensaje, foto_path, estatus_confirmacion)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            RETURNING {}
            "#,
            EMAIL_COLUMNS
        );

        sqlx::query_as::<_, OutboundEmail>(&sql)
            .bind(data.report_id)
            .bind(&data.cedula)
            .bind(&data.recipient)
            .bind(&data.subject)
            .bind(&data.body)
            .bind(&data.photo_path)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record outbound email: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Set the confirmation flag. Confirming twice is a no-op.
    ///
    /// Returns whether a record with this id exists.
    pub async fn confirm_receipt(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(CONFIRM_SQL)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to confirm email {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        let found = result.rows_affected() > 0;
        if found {
            tracing::info!("Receipt confirmed for email {}", id);
        } else {
            tracing::warn!("Confirmation for unknown email {}", id);
        }
        Ok(found)
    }

    /// Set the resolution flag. There is no way back.
    ///
    /// Returns whether a record with this id exists.
    pub async fn mark_resolved(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(RESOLVE_SQL)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to mark email {} resolved: {:?}", id, e);
                AppError::Database(e)
            })?;

        let found = result.rows_affected() > 0;
        if found {
            tracing::info!("Email {} marked resolved", id);
        }
        Ok(found)
    }

    #[cfg(test)]
    pub async fn find(&self, id: i32) -> Result<Option<OutboundEmail>> {
        let sql = format!("SELECT {} FROM correos_enviados WHERE id = $1", EMAIL_COLUMNS);

        sqlx::query_as::<_, OutboundEmail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get email {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    /// Records matching the filter, newest first
    pub async fn list(&self, filter: EmailFilter) -> Result<Vec<OutboundEmail>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM correos_enviados
            WHERE ($1::BOOLEAN IS NULL OR estatus_confirmacion = $1)
            ORDER BY id DESC
            "#,
            EMAIL_COLUMNS
        );

        sqlx::query_as::<_, OutboundEmail>(&sql)
            .bind(filter.confirmed())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list emails ({:?}): {:?}", filter, e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::models::DeliveryState;
    use crate::modules::mail::LogMailer;
    use std::path::Path;

    fn service(pool: PgPool) -> NotificationService {
        let photos = Arc::new(PhotoStore::new(std::env::temp_dir()));
        NotificationService::new(
            pool.clone(),
            Arc::new(CatalogService::new(pool.clone(), pool)),
            photos,
            Arc::new(TemplateEngine::from_dir(Path::new("templates"))),
            Arc::new(LogMailer),
            "mantenimiento@example.com".to_string(),
            "http://localhost:5000".to_string(),
        )
    }

    fn new_email(report_id: i32) -> NewOutboundEmail {
        NewOutboundEmail {
            report_id: Some(report_id),
            cedula: Some("V-1".to_string()),
            recipient: "mantenimiento@example.com".to_string(),
            subject: NOTIFICATION_SUBJECT.to_string(),
            body: Some("Fuga".to_string()),
            photo_path: None,
        }
    }

    fn assigned_columns(sql: &str) -> Vec<&str> {
        let set = sql.split(" SET ").nth(1).unwrap();
        let assignments = set.split(" WHERE ").next().unwrap();
        assignments.split(',').map(str::trim).collect()
    }

    #[test]
    fn test_flag_updates_set_true_and_touch_one_column() {
        // Setting a constant TRUE makes repeated confirmations no-ops
        assert_eq!(assigned_columns(CONFIRM_SQL), vec!["estatus_confirmacion = TRUE"]);
        assert_eq!(assigned_columns(RESOLVE_SQL), vec!["estatus_solucion = TRUE"]);
        assert!(CONFIRM_SQL.ends_with("WHERE id = $1"));
        assert!(RESOLVE_SQL.ends_with("WHERE id = $1"));
    }

    #[tokio::test]
    async fn test_flag_updates_surface_datastore_errors() {
        let config = crate::shared::test_helpers::test_config();
        let stores = crate::shared::test_helpers::lazy_datastores(&config);
        let service = service(stores.notifications);

        assert!(matches!(service.confirm_receipt(7).await, Err(AppError::Database(_))));
        assert!(matches!(service.mark_resolved(7).await, Err(AppError::Database(_))));
    }

    #[sqlx::test(migrations = "./migrations/notifications")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_confirmation_is_idempotent(pool: PgPool) {
        let service = service(pool);
        let email = service.record(&new_email(1)).await.unwrap();
        assert_eq!(email.state(), DeliveryState::Pending);

        assert!(service.confirm_receipt(email.id).await.unwrap());
        assert!(service.confirm_receipt(email.id).await.unwrap());

        let email = service.find(email.id).await.unwrap().unwrap();
        assert_eq!(email.state(), DeliveryState::Confirmed);
    }

    #[sqlx::test(migrations = "./migrations/notifications")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_resolution_is_independent_of_confirmation(pool: PgPool) {
        let service = service(pool);
        let resolved_only = service.record(&new_email(1)).await.unwrap();
        let both = service.record(&new_email(2)).await.unwrap();

        service.mark_resolved(resolved_only.id).await.unwrap();
        service.confirm_receipt(both.id).await.unwrap();
        service.mark_resolved(both.id).await.unwrap();

        let resolved_only = service.find(resolved_only.id).await.unwrap().unwrap();
        let both = service.find(both.id).await.unwrap().unwrap();
        assert_eq!(resolved_only.state(), DeliveryState::Resolved);
        assert_eq!(both.state(), DeliveryState::ConfirmedAndResolved);
    }

    #[sqlx::test(migrations = "./migrations/notifications")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_list_filters_by_confirmation(pool: PgPool) {
        let service = service(pool);
        let pending = service.record(&new_email(1)).await.unwrap();
        let confirmed = service.record(&new_email(2)).await.unwrap();
        service.confirm_receipt(confirmed.id).await.unwrap();

        let all = service.list(EmailFilter::All).await.unwrap();
        assert_eq!(
            all.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![confirmed.id, pending.id]
        );

        let only_confirmed = service.list(EmailFilter::Confirmed).await.unwrap();
        assert_eq!(only_confirmed.len(), 1);
        assert_eq!(only_confirmed[0].id, confirmed.id);

        let unconfirmed = service.list(EmailFilter::Unconfirmed).await.unwrap();
        assert_eq!(unconfirmed.len(), 1);
        assert_eq!(unconfirmed[0].id, pending.id);
    }

    #[sqlx::test(migrations = "./migrations/notifications")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unknown_ids_report_not_found(pool: PgPool) {
        let service = service(pool);
        assert!(!service.confirm_receipt(4040).await.unwrap());
        assert!(!service.mark_resolved(4040).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations/notifications")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_notify_report_records_pending_email(pool: PgPool) {
        let service = service(pool);
        // Catalog tables are not migrated here, so labels degrade to markers
        let correo_id = service
            .notify_report(SendEmailRequestDto {
                reporte_id: Some(77),
                cedula: Some("V-9".to_string()),
                categoria_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        let email = service.find(correo_id).await.unwrap().unwrap();
        assert_eq!(email.report_id, Some(77));
        assert_eq!(email.state(), DeliveryState::Pending);
        assert_eq!(email.subject, NOTIFICATION_SUBJECT);
    }
}

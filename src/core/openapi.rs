use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::catalog::{dtos as catalog_dtos, handlers as catalog_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Catalog
        catalog_handlers::obtener_fallas,
        catalog_handlers::api_categorias,
        // Dashboard
        dashboard_handlers::fallas_por_sede_categoria,
        dashboard_handlers::categoria_total,
        dashboard_handlers::categorias_totales,
        dashboard_handlers::fallas_por_categoria,
        // Notifications
        notifications_handlers::enviar_correo,
        notifications_handlers::confirmar_recepcion,
        notifications_handlers::marcar_solucionado,
    ),
    components(
        schemas(
            catalog_dtos::FaultOptionDto,
            catalog_dtos::CategoryNamesDto,
            dashboard_dtos::CountMatrixDto,
            dashboard_dtos::CategoryTotalDto,
            dashboard_dtos::CategoryCountDto,
            dashboard_dtos::CategoryShareDto,
            dashboard_dtos::CategorySummaryDto,
            dashboard_handlers::CategoryTotalResponse,
            notifications_dtos::SendEmailRequestDto,
            notifications_dtos::SentEmailDto,
            notifications_dtos::EmailRecordView,
            notifications_models::OutboundEmail,
            notifications_models::DeliveryState,
            ApiResponse<notifications_dtos::SentEmailDto>,
        )
    ),
    tags(
        (name = "catalog", description = "Categories, faults and sites"),
        (name = "dashboard", description = "Report aggregations for charts"),
        (name = "notifications", description = "Report notification emails and their confirmation"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Facility Reports API",
        version = "0.1.0",
        description = "JSON endpoints of the facilities maintenance reporting portal",
    )
)]
pub struct ApiDoc;

/// Adds the admin Basic auth scheme to the OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_basic",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

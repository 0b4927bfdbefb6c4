/// Photo extensions accepted on upload (compared case-insensitively)
pub const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Sub-directory of the static root that holds uploaded photos
pub const UPLOADS_DIR: &str = "uploads";

// =============================================================================
// LABEL MARKERS
// =============================================================================

/// Shown when a report carries no identifier at all
pub const LABEL_NOT_AVAILABLE: &str = "(N/D)";

/// Shown in email bodies when a label cannot be resolved
pub const LABEL_NOT_FOUND: &str = "No encontrado";

// =============================================================================
// NOTIFICATIONS
// =============================================================================

pub const NOTIFICATION_SUBJECT: &str = "Nuevo Reporte Registrado";

/// Content-ID of the inline report photo inside the notification email
pub const INLINE_PHOTO_CID: &str = "foto_reporte";

// =============================================================================
// CATEGORY TILES
// =============================================================================

/// Landing page tile for a category
#[derive(Debug, Clone, Copy)]
pub struct CategoryTile {
    pub id: i32,
    pub name: &'static str,
    pub image: &'static str,
}

/// Tiles rendered on the landing page. Names and images live here, while the
/// informational blurb comes from the catalog datastore.
pub const CATEGORY_TILES: &[CategoryTile] = &[
    CategoryTile {
        id: 1,
        name: "Electricos",
        image: "electrico.png",
    },
    CategoryTile {
        id: 2,
        name: "Plomeria",
        image: "plomeria.png",
    },
    CategoryTile {
        id: 3,
        name: "Refrigeracion",
        image: "refrigeracion.png",
    },
    CategoryTile {
        id: 4,
        name: "Seguridad",
        image: "seguridad.png",
    },
    CategoryTile {
        id: 5,
        name: "Infraestructura",
        image: "infraestructura.png",
    },
    CategoryTile {
        id: 6,
        name: "Mobiliario",
        image: "mobiliario.png",
    },
    CategoryTile {
        id: 7,
        name: "Suministros",
        image: "suministros.png",
    },
    CategoryTile {
        id: 8,
        name: "Tecnologicos",
        image: "tecnologico.png",
    },
];

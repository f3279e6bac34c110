use rust_decimal::Decimal;
use tracing::info;

use behuman_core::domain::catalog::{CatalogItem, CatalogItemId};
use behuman_core::tagging::infer_tags;

use crate::connection::DbPool;
use crate::repositories::{CatalogRepository, RepositoryError, SqlCatalogRepository};

/// Baseline wellness catalog. Items without tags get inferred ones on load.
const SEED_ITEMS: &[SeedItem] = &[
    SeedItem {
        id: "act-taller-duelo",
        name: "Taller de acompañamiento en duelo",
        description: "Espacio grupal guiado por psicólogos para procesar la pérdida de un ser querido",
        starting_price: Some(65_000),
        category: "Bienestar emocional",
        subcategory: "Terapia grupal",
        url: Some("https://behuman.example/actividades/taller-duelo"),
        situation_tags: &["muerte_familiar"],
        profile_tags: &["adulto", "mayor", "familia", "salud"],
    },
    SeedItem {
        id: "act-meditacion-guiada",
        name: "Meditación guiada y mindfulness",
        description: "Sesiones semanales de respiración y relajación para calmar la mente",
        starting_price: Some(35_000),
        category: "Bienestar",
        subcategory: "Meditación",
        url: Some("https://behuman.example/actividades/meditacion"),
        situation_tags: &["muerte_familiar", "rompimiento_pareja"],
        profile_tags: &["joven", "adulto", "mayor", "salud"],
    },
    SeedItem {
        id: "act-finanzas-personales",
        name: "Curso de finanzas personales",
        description: "Aprende a ordenar tus deudas, crear un presupuesto y planificar el ahorro",
        starting_price: Some(49_000),
        category: "Educación",
        subcategory: "Finanzas",
        url: Some("https://behuman.example/actividades/finanzas"),
        situation_tags: &["causa_economica"],
        profile_tags: &["adulto", "estabilidad", "bienes"],
    },
    SeedItem {
        id: "act-coaching-carrera",
        name: "Coaching de carrera profesional",
        description: "Sesiones individuales con un mentor para redefinir metas laborales",
        starting_price: Some(120_000),
        category: "Desarrollo profesional",
        subcategory: "Coaching",
        url: None,
        situation_tags: &["causa_economica", "bloqueo_incapacidad"],
        profile_tags: &["joven", "adulto", "carrera", "crecimiento_personal"],
    },
    SeedItem {
        id: "act-club-running",
        name: "Club de running",
        description: "Entrenamientos grupales al aire libre para todos los niveles",
        starting_price: Some(20_000),
        category: "Deportes",
        subcategory: "Running",
        url: None,
        situation_tags: &["rompimiento_pareja"],
        profile_tags: &["joven", "adulto", "deportes", "salud", "social"],
    },
    SeedItem {
        id: "act-taller-habilidades",
        name: "Taller de habilidades digitales",
        description: "Programación básica y herramientas de productividad para ganar confianza",
        starting_price: Some(80_000),
        category: "Capacitación",
        subcategory: "Tecnología",
        url: None,
        situation_tags: &["bloqueo_incapacidad", "causa_economica"],
        profile_tags: &["joven", "adulto", "tech", "carrera"],
    },
    SeedItem {
        id: "act-arteterapia",
        name: "Arteterapia",
        description: "Expresión creativa con pintura y collage para liberar emociones",
        starting_price: Some(45_000),
        category: "Bienestar emocional",
        subcategory: "Arte",
        url: None,
        situation_tags: &[],
        profile_tags: &[],
    },
    SeedItem {
        id: "act-caminata-naturaleza",
        name: "Caminata en la naturaleza",
        description: "Excursión guiada por senderos cercanos a la ciudad, apta para toda la familia",
        starting_price: Some(15_000),
        category: "Aire libre",
        subcategory: "Senderismo",
        url: None,
        situation_tags: &[],
        profile_tags: &[],
    },
    SeedItem {
        id: "act-cocina-saludable",
        name: "Clase de cocina saludable",
        description: "Recetas nutritivas y económicas para la semana",
        starting_price: None,
        category: "Bienestar",
        subcategory: "Cocina",
        url: None,
        situation_tags: &[],
        profile_tags: &[],
    },
    SeedItem {
        id: "act-spa-relajacion",
        name: "Jornada de spa y masajes",
        description: "Masaje descontracturante y circuito de relajación",
        starting_price: Some(150_000),
        category: "Bienestar",
        subcategory: "Spa",
        url: None,
        situation_tags: &["muerte_familiar"],
        profile_tags: &["adulto", "mayor", "salud"],
    },
];

/// Deterministic catalog fixtures for local runs and tests.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    /// Items as they are written to the catalog, with inferred tags filled in.
    pub fn items() -> Vec<CatalogItem> {
        SEED_ITEMS.iter().map(SeedItem::to_catalog_item).collect()
    }

    /// Upserts the seed catalog. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let repo = SqlCatalogRepository::new(pool.clone());
        let mut inferred = Vec::new();

        for seed in SEED_ITEMS {
            if seed.needs_inference() {
                inferred.push(seed.id);
            }
            repo.save(seed.to_catalog_item()).await?;
        }

        info!(
            event_name = "db.fixtures.catalog_seeded",
            item_count = SEED_ITEMS.len(),
            inferred_count = inferred.len(),
            "catalog seed loaded"
        );

        Ok(SeedResult { items_seeded: SEED_ITEMS.len(), inferred_tags: inferred })
    }

    /// Checks that every seed item is present and tagged for at least one situation.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let repo = SqlCatalogRepository::new(pool.clone());
        let mut checks = Vec::with_capacity(SEED_ITEMS.len());

        for seed in SEED_ITEMS {
            let present = repo
                .find_by_id(&CatalogItemId(seed.id.to_string()))
                .await?
                .is_some_and(|item| !item.situation_tags.is_empty() && item.name == seed.name);
            checks.push((seed.id, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the seed items, leaving any operator-managed items alone.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for seed in SEED_ITEMS {
            sqlx::query("DELETE FROM catalog_item WHERE id = ?")
                .bind(seed.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedItem {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    starting_price: Option<i64>,
    category: &'static str,
    subcategory: &'static str,
    url: Option<&'static str>,
    situation_tags: &'static [&'static str],
    profile_tags: &'static [&'static str],
}

impl SeedItem {
    fn needs_inference(&self) -> bool {
        self.situation_tags.is_empty() || self.profile_tags.is_empty()
    }

    fn to_catalog_item(&self) -> CatalogItem {
        let mut item = CatalogItem::new(self.id, self.name);
        item.description = self.description.to_string();
        item.starting_price = self.starting_price.map(|price| Decimal::new(price, 0));
        item.category = self.category.to_string();
        item.subcategory = self.subcategory.to_string();
        item.url = self.url.map(str::to_string);
        item.situation_tags = self.situation_tags.iter().map(|tag| tag.to_string()).collect();
        item.profile_tags = self.profile_tags.iter().map(|tag| tag.to_string()).collect();

        if self.needs_inference() {
            let inferred = infer_tags(&item);
            if item.situation_tags.is_empty() {
                item.situation_tags = inferred.situation_tags;
            }
            if item.profile_tags.is_empty() {
                item.profile_tags = inferred.profile_tags;
            }
        }
        item
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub items_seeded: usize,
    /// Ids whose tags were inferred rather than curated.
    pub inferred_tags: Vec<&'static str>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

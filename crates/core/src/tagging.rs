//! Keyword-driven inference of catalog item tags.
//!
//! Used when loading catalog items that arrive without tags and by the
//! `retag` maintenance command.

use crate::domain::catalog::CatalogItem;
use crate::domain::situation::SituationCategory;

const BEREAVEMENT_TRIGGERS: &[&str] = &[
    "yoga",
    "meditación",
    "mindfulness",
    "spa",
    "relajación",
    "massage",
    "masaje",
    "terapia",
    "psicología",
    "psicólog",
    "art therapy",
    "arteterapia",
    "music therapy",
    "musicoterapia",
    "retiro",
    "wellness",
    "holístico",
    "acupuntura",
    "reiki",
    "horticultura",
    "flores",
];

const ECONOMIC_TRIGGERS: &[&str] = &[
    "curso",
    "capacitación",
    "educación",
    "educativo",
    "aprendizaje",
    "formación",
    "entrenamiento",
    "workshop",
    "webinar",
    "seminario",
    "taller",
    "emprendimiento",
    "startup",
    "negocio",
    "carrera",
    "empleo",
    "trabajo",
    "laboral",
    "habilidad",
    "skill",
    "profesional",
    "asesoría",
    "consultoría",
    "mentor",
    "coaching",
    "finanzas",
    "financiera",
    "presupuesto",
    "ahorro",
    "inversión",
    "gratis",
    "gratuito",
    "económico",
    "asequible",
    "tech",
    "tecnología",
    "programación",
    "código",
];

const INCOMPETENCE_TRIGGERS: &[&str] = &[
    "aprender",
    "aprendizaje",
    "curso",
    "introducción",
    "fundamentos",
    "básico",
    "principiante",
    "iniciante",
    "mentoría",
    "mentor",
    "coaching",
    "desarrollo personal",
    "crecimiento",
    "autoestima",
    "confianza",
    "transformación",
    "superar",
    "reto",
    "desafío",
    "logro",
    "éxito",
    "apoyo emocional",
    "psicología",
    "asesoría personal",
    "competencia",
];

const BREAKUP_TRIGGERS: &[&str] = &[
    "deporte",
    "deportivo",
    "fútbol",
    "basketball",
    "tenis",
    "golf",
    "voleibol",
    "natación",
    "ciclismo",
    "atletismo",
    "cross fit",
    "crossfit",
    "gym",
    "fitness",
    "entrenamiento",
    "ejercicio",
    "actividad física",
    "team building",
    "team",
    "equipo",
    "grupo",
    "social",
    "evento",
    "fiesta",
    "baile",
    "danza",
    "concierto",
    "música",
    "viaje",
    "turismo",
    "excursión",
    "aventura",
    "camping",
    "amigos",
    "diversión",
    "entretenimiento",
    "recreación",
];

const YOUTH_TRIGGERS: &[&str] = &[
    "gaming",
    "videojuego",
    "gamer",
    "esports",
    "deporte extremo",
    "parkour",
    "skate",
    "dron",
    "vr",
    "realidad virtual",
    "redes sociales",
    "influencer",
    "tiktok",
    "trending",
];

const ADULT_TRIGGERS: &[&str] = &[
    "profesional",
    "ejecutivo",
    "liderazgo",
    "dirección",
    "carrera ejecutiva",
    "familia",
    "padre",
    "madre",
    "responsabilidad",
    "balance",
    "work-life",
    "vino",
    "golf",
    "gourmet",
];

const SENIOR_TRIGGERS: &[&str] = &[
    "senior",
    "mayor",
    "tercera edad",
    "jubilado",
    "retiro",
    "50+",
    "abuelo",
    "sabiduria",
    "experiencia",
    "bajo impacto",
];

const ALL_AGES_TRIGGERS: &[&str] = &["todas edades", "cualquier edad"];

const INTEREST_RULES: &[(&str, &[&str])] = &[
    (
        "tech",
        &[
            "tech",
            "tecnología",
            "programación",
            "código",
            "computador",
            "software",
            "digital",
            "coding",
            "desarrollo",
            "app",
        ],
    ),
    (
        "musica",
        &[
            "música",
            "musical",
            "concierto",
            "canto",
            "canta",
            "voz",
            "instrumento",
            "banda",
            "jazz",
            "clásico",
            "rock",
            "pop",
        ],
    ),
    (
        "deportes",
        &[
            "deporte",
            "deportivo",
            "ejercicio",
            "gym",
            "fitness",
            "entrenamiento",
            "fútbol",
            "basketball",
            "tenis",
            "voleibol",
            "natación",
            "atletismo",
            "ciclismo",
            "running",
        ],
    ),
    ("arte", &["arte", "pintura", "dibujo", "escultura", "galería", "artístico", "creativo"]),
    ("lectura", &["lectura", "libro", "leer", "literatura", "novela", "autor"]),
    ("cocina", &["cocina", "culinaria", "gastronom", "chef", "receta", "gourmet"]),
    ("viajes", &["viaje", "turismo", "excursión", "tour", "destino", "viajero"]),
    (
        "naturaleza",
        &["naturaleza", "aire libre", "outdoor", "camping", "montaña", "parque", "sendero", "verde"],
    ),
    ("manualidades", &["manualidad", "craft", "diy", "artesanía"]),
    ("social", &["social", "grupo", "amigos", "team", "evento", "encuentro", "reunión"]),
    ("familia", &["familia", "familiar", "padre", "madre", "hijo"]),
    ("amigos", &["amigo", "amigos", "amistad", "conexión", "comunidad"]),
    ("carrera", &["carrera", "profesional", "trabajo", "empleo", "laboral", "empresario"]),
    ("salud", &["salud", "bienestar", "wellness", "fitness", "medicina", "nutrición"]),
    (
        "crecimiento_personal",
        &[
            "crecimiento personal",
            "desarrollo personal",
            "transformación",
            "educación",
            "mejora",
            "superación",
        ],
    ),
    ("estabilidad", &["estabilidad", "seguridad", "paz", "tranquilidad", "equilibrio"]),
    ("bienes", &["bienes", "casa", "propiedad", "inmueble", "vivienda"]),
];

/// Suggested tags for one catalog item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferredTags {
    pub situation_tags: Vec<String>,
    pub profile_tags: Vec<String>,
}

pub fn infer_tags(item: &CatalogItem) -> InferredTags {
    InferredTags {
        situation_tags: infer_situation_tags(item),
        profile_tags: infer_profile_tags(item),
    }
}

/// Situations an activity is likely to help with. Never empty: items with no
/// trigger fall back on their main category.
pub fn infer_situation_tags(item: &CatalogItem) -> Vec<String> {
    let text = tagging_text(item);
    let mut categories = Vec::new();

    let calming_music = text.contains("música")
        && (text.contains("tranquilo") || text.contains("relajante"));
    let nature_walk =
        text.contains("naturaleza") && (text.contains("camina") || text.contains("excursión"));
    if contains_any(&text, BEREAVEMENT_TRIGGERS) || calming_music || nature_walk {
        categories.push(SituationCategory::Bereavement);
    }
    if contains_any(&text, ECONOMIC_TRIGGERS) {
        categories.push(SituationCategory::EconomicHardship);
    }
    if contains_any(&text, INCOMPETENCE_TRIGGERS) {
        categories.push(SituationCategory::PerceivedIncompetence);
    }
    if contains_any(&text, BREAKUP_TRIGGERS) {
        categories.push(SituationCategory::Breakup);
    }

    if categories.is_empty() {
        let main = item.category.to_lowercase();
        categories = if main.contains("educación") || main.contains("capacitación") {
            vec![SituationCategory::EconomicHardship, SituationCategory::PerceivedIncompetence]
        } else if main.contains("deporte") || main.contains("bienestar") {
            vec![SituationCategory::Breakup, SituationCategory::Bereavement]
        } else {
            vec![SituationCategory::PerceivedIncompetence, SituationCategory::EconomicHardship]
        };
    }

    categories.into_iter().map(|category| category.as_tag().to_owned()).collect()
}

/// Age bracket, hobby and goal tags for an activity.
pub fn infer_profile_tags(item: &CatalogItem) -> Vec<String> {
    let text = tagging_text(item);
    let mut tags: Vec<&str> = Vec::new();

    let youth = contains_any(&text, YOUTH_TRIGGERS);
    let adult = contains_any(&text, ADULT_TRIGGERS);
    let senior = contains_any(&text, SENIOR_TRIGGERS);

    if youth {
        tags.push("joven");
    }
    if adult || (!youth && !senior) {
        tags.push("adulto");
    }
    if senior || contains_any(&text, ALL_AGES_TRIGGERS) {
        tags.push("mayor");
    }

    for (tag, triggers) in INTEREST_RULES {
        if contains_any(&text, triggers) && !tags.contains(tag) {
            tags.push(tag);
        }
    }

    tags.into_iter().map(str::to_owned).collect()
}

fn tagging_text(item: &CatalogItem) -> String {
    format!("{} {} {} {}", item.name, item.description, item.category, item.subcategory)
        .to_lowercase()
}

fn contains_any(text: &str, triggers: &[&str]) -> bool {
    triggers.iter().any(|trigger| text.contains(trigger))
}

//! Static vocabulary for situation detection, item scoring and message
//! composition. Everything here is immutable `'static` data.

use crate::domain::situation::SituationCategory;

/// Keyword and tag vocabulary for one situation category.
#[derive(Debug)]
pub struct SituationLexicon {
    pub category: SituationCategory,
    pub description: &'static str,
    /// Activity tags that help people in this situation.
    pub beneficial_tags: &'static [&'static str],
    /// Activity tags that tend to hurt people in this situation.
    pub avoid_tags: &'static [&'static str],
    /// Lowercase phrases matched as substrings of a lowercased transcript.
    pub keywords: &'static [&'static str],
    /// Second-pass rules refining the category into a subtype. First match wins.
    pub subtypes: &'static [SubtypeRule],
    pub confrontations: &'static [(&'static str, &'static str)],
    pub calming_phrases: &'static [&'static str; 4],
}

#[derive(Debug)]
pub struct SubtypeRule {
    pub subtype: &'static str,
    pub triggers: &'static [&'static str],
}

impl SituationLexicon {
    /// Keywords present in `lowered_text`, in lexicon order.
    pub fn matched_keywords(&self, lowered_text: &str) -> Vec<&'static str> {
        self.keywords.iter().copied().filter(|keyword| lowered_text.contains(keyword)).collect()
    }

    pub fn subtype_for(&self, lowered_text: &str) -> Option<&'static str> {
        self.subtypes
            .iter()
            .find(|rule| rule.triggers.iter().any(|trigger| lowered_text.contains(trigger)))
            .map(|rule| rule.subtype)
    }

    /// Confrontation fragment for the subtype, or the category's general one.
    pub fn confrontation(&self, subtype: &str) -> &'static str {
        self.confrontations
            .iter()
            .find(|(key, _)| *key == subtype)
            .or_else(|| self.confrontations.iter().find(|(key, _)| *key == super::GENERAL_SUBTYPE))
            .map(|(_, phrase)| *phrase)
            .unwrap_or_default()
    }
}

const BEREAVEMENT: SituationLexicon = SituationLexicon {
    category: SituationCategory::Bereavement,
    description: "La pérdida requiere espacios de calma para procesar el duelo",
    beneficial_tags: &[
        "tranquilo",
        "introspectivo",
        "naturaleza",
        "mindfulness",
        "expresivo",
        "arte",
        "musica",
    ],
    avoid_tags: &["competitivo", "fiesta", "alta_estimulacion"],
    keywords: &[
        "murió",
        "falleció",
        "partió",
        "muerte",
        "duelo",
        "perdí",
        "perdida",
        "padre",
        "madre",
        "abuelo",
        "abuela",
        "hermano",
        "hermana",
        "hijo",
        "hija",
        "funeral",
        "luto",
        "extraño mucho",
        "ya no está",
        "se fue",
    ],
    subtypes: &[
        SubtypeRule { subtype: "padres", triggers: &["padre", "madre", "padres"] },
        SubtypeRule { subtype: "abuelos", triggers: &["abuelo", "abuela"] },
        SubtypeRule { subtype: "hermanos", triggers: &["hermano", "hermana"] },
        SubtypeRule { subtype: "hijos", triggers: &["hijo", "hija"] },
    ],
    confrontations: &[
        ("padres", "enfrentarte a la pérdida de tus padres"),
        ("abuelos", "despedirte de quien te vio crecer"),
        ("hermanos", "sobrellevar la partida de tu hermano/a"),
        ("hijos", "atravesar la pérdida más dolorosa que existe"),
        ("general", "enfrentar la partida de alguien que amabas profundamente"),
    ],
    calming_phrases: &[
        "Este dolor es parte de haber amado profundamente.",
        "No hay tiempo correcto para sanar, solo el tuyo.",
        "Cada día que enfrentas es un acto de valentía.",
        "Su memoria vive en ti, y eso nadie te lo quita.",
    ],
};

const ECONOMIC_HARDSHIP: SituationLexicon = SituationLexicon {
    category: SituationCategory::EconomicHardship,
    description: "Desarrollar habilidades y encontrar nuevas oportunidades",
    beneficial_tags: &["carrera", "tech", "crecimiento_personal", "bienes", "social"],
    avoid_tags: &["lujo", "exclusivo"],
    keywords: &[
        "dinero",
        "plata",
        "deudas",
        "despido",
        "despidieron",
        "sin trabajo",
        "desempleo",
        "no me alcanza",
        "crisis económica",
        "quiebra",
        "bancarrota",
        "salario",
        "sueldo",
        "laboral",
        "jefe",
        "oficina",
        "empresa",
        "negocio",
        "freelance",
        "emprendimiento",
        "navidad",
        "diciembre",
    ],
    subtypes: &[
        SubtypeRule { subtype: "despido", triggers: &["despido", "despidieron"] },
        SubtypeRule { subtype: "deudas", triggers: &["deuda", "deudas"] },
        SubtypeRule { subtype: "negocio", triggers: &["negocio", "empresa"] },
        SubtypeRule { subtype: "temporada", triggers: &["navidad", "diciembre"] },
    ],
    confrontations: &[
        ("despido", "levantarte después de perder tu trabajo"),
        ("deudas", "salir adelante con el peso de las deudas"),
        ("negocio", "reconstruir después de un golpe al negocio"),
        ("temporada", "manejar las presiones económicas de la temporada"),
        ("general", "encontrar estabilidad en medio de la incertidumbre económica"),
    ],
    calming_phrases: &[
        "Las crisis económicas son temporales, tus habilidades no.",
        "Muchos han estado donde estás y salieron adelante.",
        "Tu valor no se define por tu situación financiera.",
        "Cada paso pequeño te acerca a la estabilidad.",
    ],
};

const PERCEIVED_INCOMPETENCE: SituationLexicon = SituationLexicon {
    category: SituationCategory::PerceivedIncompetence,
    description: "Reconstruir confianza a través de logros pequeños y conexión",
    beneficial_tags: &["crecimiento_personal", "tech", "carrera", "salud", "social", "arte"],
    avoid_tags: &["competitivo", "alta_presion"],
    keywords: &[
        "incapaz",
        "no puedo",
        "no sirvo",
        "inútil",
        "incompetente",
        "perdido",
        "caso perdido",
        "fracasado",
        "impostor",
        "síndrome impostor",
        "no entiendo",
        "no aprendo",
        "torpe",
        "no sé nada",
        "tecnología",
        "no rindo",
        "bloqueado",
        "estancado",
        "sin futuro",
        "acabado",
        "vida acabada",
        "no valgo",
    ],
    subtypes: &[
        SubtypeRule { subtype: "tech", triggers: &["tecnología", "tech", "computador"] },
        SubtypeRule { subtype: "laboral", triggers: &["trabajo", "laboral"] },
        SubtypeRule { subtype: "aprendizaje", triggers: &["estudios", "aprender"] },
    ],
    confrontations: &[
        ("tech", "superar el bloqueo con la tecnología"),
        ("laboral", "recuperar la confianza en tu trabajo"),
        ("aprendizaje", "encontrar tu forma de aprender"),
        ("general", "reconstruir la confianza en ti mismo/a"),
    ],
    calming_phrases: &[
        "Sentirte perdido no significa que lo estés.",
        "Todos empezamos sin saber, y todos podemos aprender.",
        "Tu capacidad de mejorar es mayor de lo que crees.",
        "El primer paso siempre se siente imposible hasta que lo das.",
    ],
};

const BREAKUP: SituationLexicon = SituationLexicon {
    category: SituationCategory::Breakup,
    description: "El movimiento físico y las conexiones sociales ayudan a sanar",
    beneficial_tags: &["activo", "social", "deportes", "viajes", "amigos", "musica"],
    avoid_tags: &["romantico", "parejas", "citas"],
    keywords: &[
        "ruptura",
        "terminamos",
        "separación",
        "divorcio",
        "ex",
        "dejó",
        "dejé",
        "corazón roto",
        "infiel",
        "infidelidad",
        "engañó",
        "tusa",
        "despecho",
        "soltera",
        "soltero",
        "relación",
        "pareja",
        "novio",
        "novia",
        "amor",
    ],
    subtypes: &[
        SubtypeRule { subtype: "divorcio", triggers: &["divorcio"] },
        SubtypeRule { subtype: "infidelidad", triggers: &["infiel", "engañó"] },
    ],
    confrontations: &[
        ("divorcio", "reconstruirte después del divorcio"),
        ("infidelidad", "sanar después de una traición"),
        ("general", "levantarte después de una ruptura"),
    ],
    calming_phrases: &[
        "Lo que sientes ahora no es permanente.",
        "El vacío actual dejará espacio para algo nuevo.",
        "Mereces tiempo para reconstruirte.",
        "Esta ruptura no define tu capacidad de amar o ser amado/a.",
    ],
};

static LEXICONS: [SituationLexicon; 4] =
    [BEREAVEMENT, ECONOMIC_HARDSHIP, PERCEIVED_INCOMPETENCE, BREAKUP];

pub fn lexicon_for(category: SituationCategory) -> &'static SituationLexicon {
    match category {
        SituationCategory::Bereavement => &LEXICONS[0],
        SituationCategory::EconomicHardship => &LEXICONS[1],
        SituationCategory::PerceivedIncompetence => &LEXICONS[2],
        SituationCategory::Breakup => &LEXICONS[3],
    }
}

/// All lexicons in declaration order.
pub fn lexicons() -> &'static [SituationLexicon] {
    &LEXICONS
}

const ACTIVITY_BENEFITS: &[(&str, &str)] = &[
    ("tranquilo", "la calma te ayudará a reconectar contigo mismo"),
    ("activo", "el movimiento físico libera tensión y mejora el ánimo"),
    ("social", "conectar con otros nos recuerda que no estamos solos"),
    ("creativo", "expresar lo que las palabras no alcanzan sana"),
    ("aventurero", "cambiar de ambiente ayuda a ganar perspectiva"),
    ("introspectivo", "el autoconocimiento es el primer paso hacia la paz"),
    ("disciplinado", "la rutina puede ser un ancla en tiempos difíciles"),
    ("autocuidado", "cuidarte a ti mismo es lo más valiente que puedes hacer"),
    ("tech", "dominar nuevas herramientas te dará confianza"),
    ("musica", "la música expresa lo que las palabras no pueden"),
    ("deportes", "el ejercicio libera endorfinas y despeja la mente"),
    ("arte", "crear algo te conecta con una parte profunda de ti"),
    ("naturaleza", "la naturaleza tiene un poder sanador comprobado"),
    ("carrera", "desarrollar nuevas habilidades abre puertas"),
];

/// Benefit clause for an activity tag, matched case-insensitively.
pub fn activity_benefit(tag: &str) -> Option<&'static str> {
    let tag = tag.to_lowercase();
    ACTIVITY_BENEFITS.iter().find(|(key, _)| *key == tag).map(|(_, benefit)| *benefit)
}

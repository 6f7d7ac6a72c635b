//! Reference catalogs: profit centers and the service offering.

use serde::Serialize;

/// Label returned for ids that are invalid or not in the catalog.
pub const GENERAL_PROFIT_CENTER: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfitCenter {
    pub id: u32,
    pub label: &'static str,
}

pub const PROFIT_CENTERS: &[ProfitCenter] = &[
    ProfitCenter {
        id: 9,
        label: "Estrategia, Innovación y Cultura",
    },
    ProfitCenter {
        id: 11,
        label: "Gestión Tecnológica e I+D",
    },
    ProfitCenter {
        id: 12,
        label: "Sostenibilidad",
    },
    ProfitCenter {
        id: 272,
        label: "Productividad e IA",
    },
    ProfitCenter {
        id: 10,
        label: "Innk",
    },
    ProfitCenter {
        id: 44,
        label: "Upskill",
    },
];

/// Resolves a profit center id (as stored on a deal) to its label.
///
/// Only the leading digits count, so `"12abc"` and `"12.5"` both resolve as 12.
pub fn profit_center_name(id: &str) -> &'static str {
    let digits: String = id
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let Ok(numeric) = digits.parse::<u32>() else {
        tracing::warn!("Invalid profit center id: {:?}", id);
        return GENERAL_PROFIT_CENTER;
    };

    PROFIT_CENTERS
        .iter()
        .find(|center| center.id == numeric)
        .map_or(GENERAL_PROFIT_CENTER, |center| center.label)
}

pub fn profit_center_id(label: &str) -> Option<u32> {
    PROFIT_CENTERS
        .iter()
        .find(|center| center.label == label)
        .map(|center| center.id)
}

/// Services a proposal may select from.
///
/// Prefixes: E strategy, I innovation, CI innovation culture, C culture.
pub const SERVICE_CATALOG: &[&str] = &[
    "E - Planificación Estratégica",
    "E - Pensamiento integrativo para líderes",
    "E - Acompañamiento para decisiones estratégicas",
    "E - Research: Estudios B2B",
    "E - Research: Estudio de tendencias",
    "E - Research: Estudios CX",
    "I - Diagnóstico C3: Full",
    "I - Diagnóstico C3: Gestión de innovación",
    "I - Diagnóstico C3: C-Level",
    "I - Campañas de ideas: Nivel Compañía",
    "I - Campañas de ideas: Focalizada en áreas / talentos",
    "I - Campañas de ideas: Hackatones",
    "I - Asesorías de Portafolio",
    "I - Potenciamiento de proyectos",
    "I - Gestión del cambio para proyectos estratégicos",
    "I - Innovación abierta: Scouting rápido",
    "I - Innovación abierta: Venture client",
    "I - Innovación 360°",
    "I - Deep Needfinding y ODI",
    "CI - Evaluación de cultura de innovación C3",
    "CI - Campañas de ideas (Cultura)",
    "CI - Hackatones (Cultura)",
    "CI - Talleres culturales",
    "CI - Encuestas culturales",
    "CI - Experiencias in-situ",
    "CI - Programas de Embajadores de innovación",
    "CI - Capacitación en Innovación",
    "CI - Capacitación en Agilidad",
    "CI - Capacitación en Metodologías",
    "C - Programas a medida de transformación cultural",
    "C - Diseño ad-hoc de modelos de cultura corporativa",
];

pub fn is_catalog_service(name: &str) -> bool {
    SERVICE_CATALOG.contains(&name)
}

/// Lead sources offered when registering a deal.
pub const DEAL_SOURCES: &[&str] = &[
    "Recomendado",
    "Hunting",
    "Campaña outbound",
    "Evento de relacionamiento",
    "Cliente antiguo",
    "Cross-selling de Grupo MMC",
];

pub fn is_known_source(source: &str) -> bool {
    DEAL_SOURCES.contains(&source)
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;

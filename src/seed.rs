//! Demo records used to populate an empty store on first start.

use crate::domain::{
    BudgetStatus, Deal, DealId, LastAction, Potential, PotentialProbability, Proposal,
    ProposalContext, ProposalId, ProposalIdeas, ProposalStatus,
};
use crate::status_policy::{self, PROPOSAL_STARTED};
use crate::store::CrmState;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::Rng;

/// Upper bound, in days, of the demo in-development proposal's delivery estimate.
pub const MAX_DEMO_DELIVERY_DAYS: i64 = 14;

fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Two demo deals, each with one proposal.
///
/// The in-development proposal gets a delivery estimate between 1 and
/// `MAX_DEMO_DELIVERY_DAYS` days after `now`.
pub fn demo_state(now: DateTime<Utc>) -> CrmState {
    let delivery_days = rand::thread_rng().gen_range(1..=MAX_DEMO_DELIVERY_DAYS);

    let bank = Deal {
        id: DealId::from("deal-1"),
        name: "Transformación digital para Banco Nacional".to_string(),
        company: "Banco Nacional".to_string(),
        contact: "Carlos Méndez".to_string(),
        position: "CIO".to_string(),
        profit_center: "Gestión Tecnológica".to_string(),
        source: "Recomendado".to_string(),
        created_at: utc_date(2023, 11, 15),
    };

    let insurer = Deal {
        id: DealId::from("deal-2"),
        name: "Programa de innovación corporativa".to_string(),
        company: "Seguros Pacífico".to_string(),
        contact: "María González".to_string(),
        position: "Directora de Innovación".to_string(),
        profit_center: "Estrategia, Innovación y Cultura".to_string(),
        source: "Evento de relacionamiento".to_string(),
        created_at: utc_date(2023, 12, 3),
    };

    let bank_started = utc_date(2023, 11, 18);
    let bank_proposal = Proposal {
        id: ProposalId::from("proposal-1"),
        deal_id: bank.id.clone(),
        deal_name: bank.name.clone(),
        status: ProposalStatus::InDevelopment,
        budget_status: BudgetStatus::InReview,
        created_at: bank_started,
        estimated_delivery_date: Some(now + Duration::days(delivery_days)),
        last_action: Some(LastAction {
            action: PROPOSAL_STARTED.to_string(),
            date: bank_started,
            by: Some("Ana Martínez".to_string()),
            comments: None,
        }),
        context: ProposalContext {
            business_context: "El banco busca modernizar sus sistemas para mejorar la experiencia del cliente y optimizar procesos internos.".to_string(),
            client_needs: "Necesitan una estrategia clara de transformación digital que incluya roadmap y priorización de iniciativas.".to_string(),
            expected_results: "Esperan reducir costos operativos en un 20% y mejorar la satisfacción del cliente en un 30%.".to_string(),
        },
        ideas: ProposalIdeas {
            selected_ideas: strings(&[
                "I - Diagnóstico C3: Full",
                "I - Potenciamiento de proyectos",
                "I - Gestión del cambio para proyectos estratégicos",
            ]),
            additional_ideas: "Consideración especial para la integración con sistemas legacy.".to_string(),
            implementation_ideas: "Enfoque por fases, comenzando con áreas de mayor impacto al cliente.".to_string(),
        },
        p_and_p: PotentialProbability {
            potential: Potential::High,
            estimated_value: Some(175_000.0),
            probability: Some(70),
            optimal_delivery_date: NaiveDate::from_ymd_opt(2024, 7, 15),
        },
    };

    let insurer_proposal = Proposal {
        id: ProposalId::from("proposal-2"),
        deal_id: insurer.id.clone(),
        deal_name: insurer.name.clone(),
        status: ProposalStatus::ReadyForReview,
        budget_status: BudgetStatus::Ready,
        created_at: utc_date(2023, 12, 10),
        estimated_delivery_date: None,
        last_action: Some(LastAction {
            action: status_policy::action_label(ProposalStatus::ReadyForReview).to_string(),
            date: utc_date(2024, 1, 20),
            by: Some("Pedro Sánchez".to_string()),
            comments: None,
        }),
        context: ProposalContext {
            business_context: "La aseguradora busca desarrollar nuevos productos y servicios para mantenerse competitiva.".to_string(),
            client_needs: "Necesitan un programa estructurado de innovación que involucre a toda la organización.".to_string(),
            expected_results: "Buscan lanzar al menos 3 nuevos productos/servicios en los próximos 12 meses.".to_string(),
        },
        ideas: ProposalIdeas {
            selected_ideas: strings(&[
                "I - Campañas de ideas: Nivel Compañía",
                "CI - Talleres culturales",
                "CI - Programas de Embajadores de innovación",
                "CI - Capacitación en Innovación",
            ]),
            additional_ideas: "Incluir un sistema de reconocimiento para los colaboradores más innovadores.".to_string(),
            implementation_ideas: "Comenzar con un piloto en el área de productos y luego expandir.".to_string(),
        },
        p_and_p: PotentialProbability {
            potential: Potential::Medium,
            estimated_value: Some(90_000.0),
            probability: Some(85),
            optimal_delivery_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        },
    };

    CrmState {
        deals: vec![bank, insurer],
        proposals: vec![bank_proposal, insurer_proposal],
        is_authenticated: false,
        user_id: None,
    }
}

#[cfg(test)]
#[path = "tests/seed_tests.rs"]
mod tests;

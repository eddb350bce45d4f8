// src/models/stats.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lead::{LeadStatus, LeadSource};

// Contadores do painel principal
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadCounters {
    pub total: i64,
    pub hot: i64,
    pub warm: i64,
    pub cold: i64,

    // Follow-ups com nextActionDate dentro de hoje
    pub today_follow_ups: i64,

    // Leads criados hoje
    pub new_today: i64,
}

// Linha do agrupamento por origem
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct SourceCount {
    pub source: LeadSource,
    pub count: i64,
}

// Linha do agrupamento por dia do funil
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct FunnelDayCount {
    pub day: i16,
    pub count: i64,
}

// Projeção enxuta de um lead com follow-up agendado
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpEntry {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub status: LeadStatus,
    pub next_action: Option<String>,
    pub next_action_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub stats: LeadCounters,
    pub by_source: Vec<SourceCount>,
    pub by_funnel_day: Vec<FunnelDayCount>,
    pub upcoming_follow_ups: Vec<FollowUpEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stats_response_wire_shape() {
        let response = StatsResponse {
            stats: LeadCounters {
                total: 10,
                hot: 4,
                warm: 4,
                cold: 2,
                today_follow_ups: 1,
                new_today: 2,
            },
            by_source: vec![SourceCount { source: LeadSource::Gmb, count: 5 }],
            by_funnel_day: vec![FunnelDayCount { day: 0, count: 3 }],
            upcoming_follow_ups: vec![],
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["stats"]["todayFollowUps"], json!(1));
        assert_eq!(value["stats"]["newToday"], json!(2));
        assert_eq!(value["bySource"][0]["source"], json!("GMB"));
        assert_eq!(value["byFunnelDay"][0]["day"], json!(0));
        assert!(value["upcomingFollowUps"].as_array().unwrap().is_empty());
    }
}

// src/services/csv_service.rs

use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, LeadRepository},
    models::{
        activity::ActivityType,
        auth::User,
        lead::{CreateLeadPayload, ExportLeadsQuery, ImportLeadsResponse, Lead, LeadSource, LeadStatus},
    },
};

// Cabeçalho do export, na ordem em que as colunas saem
const EXPORT_HEADERS: [&str; 12] = [
    "Name",
    "Phone",
    "Email",
    "Interest",
    "Source",
    "Funnel Day",
    "Status",
    "Tags",
    "Notes",
    "Next Action",
    "Created At",
    "Last Contacted",
];

// Busca um campo aceitando os dois estilos de cabeçalho ("phone" ou "Phone").
// Campo vazio conta como ausente, para o default entrar no lugar.
fn field<'a>(
    headers: &StringRecord,
    record: &'a StringRecord,
    names: &[&str],
) -> Option<&'a str> {
    for name in names {
        if let Some(idx) = headers.iter().position(|h| h == *name) {
            if let Some(value) = record.get(idx) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Converte uma linha do CSV em payload de criação. Erros voltam como texto
/// pronto para a lista `errors` da resposta (sem o prefixo "Row N:").
pub(crate) fn parse_row(
    headers: &StringRecord,
    record: &StringRecord,
) -> Result<CreateLeadPayload, String> {
    let name = field(headers, record, &["name", "Name"]).ok_or("name is required")?;
    let phone = field(headers, record, &["phone", "Phone"]).ok_or("phone is required")?;
    let email = field(headers, record, &["email", "Email"]).ok_or("email is required")?;
    let interest = field(headers, record, &["interest", "Interest"]).unwrap_or("General");

    let source = match field(headers, record, &["source", "Source"]) {
        Some(raw) => raw.parse::<LeadSource>()?,
        None => LeadSource::Other,
    };
    let status = match field(headers, record, &["status", "Status"]) {
        Some(raw) => raw.parse::<LeadStatus>()?,
        None => LeadStatus::Warm,
    };

    let funnel_day = match field(headers, record, &["funnelDay", "Funnel Day"]) {
        Some(raw) => raw
            .parse::<i16>()
            .map_err(|_| format!("invalid funnel day '{}'", raw))?,
        None => 0,
    };
    if !(0..=7).contains(&funnel_day) {
        return Err("funnel day must be between 0 and 7".to_string());
    }

    let tags = field(headers, record, &["tags", "Tags"])
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    Ok(CreateLeadPayload {
        name: name.to_string(),
        phone: phone.to_string(),
        email: email.to_lowercase(),
        interest: interest.to_string(),
        source,
        funnel_day: Some(funnel_day),
        status: Some(status),
        next_action: field(headers, record, &["nextAction", "Next Action"]).map(String::from),
        next_action_date: None,
        tags: Some(tags),
        notes: Some(field(headers, record, &["notes", "Notes"]).unwrap_or("").to_string()),
        assigned_to: None,
    })
}

// Mesmo formato do toISOString do JS: milissegundos + Z
fn iso_millis(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn leads_to_csv(leads: &[Lead]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(vec![]);

    writer.write_record(EXPORT_HEADERS)?;

    for lead in leads {
        let funnel_day = lead.funnel_day.to_string();
        let tags = lead.tags.join(", ");
        let created_at = iso_millis(&lead.created_at);
        let last_contacted = lead
            .last_contacted_at
            .map(|d| iso_millis(&d))
            .unwrap_or_default();

        writer.write_record([
            lead.name.as_str(),
            lead.phone.as_str(),
            lead.email.as_str(),
            lead.interest.as_str(),
            lead.source.as_str(),
            funnel_day.as_str(),
            lead.status.as_str(),
            tags.as_str(),
            lead.notes.as_str(),
            lead.next_action.as_deref().unwrap_or(""),
            created_at.as_str(),
            last_contacted.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar o CSV: {}", e))?;
    Ok(bytes)
}

pub(crate) fn export_filename() -> String {
    format!("leads-export-{}.csv", Utc::now().format("%Y-%m-%d"))
}

// "id1,id2" => ids válidos; None quando a lista não traz nenhum UUID
fn parse_ids(raw: Option<&str>) -> Option<Vec<Uuid>> {
    let ids: Vec<Uuid> = raw?
        .split(',')
        .filter_map(|part| Uuid::parse_str(part.trim()).ok())
        .collect();
    if ids.is_empty() { None } else { Some(ids) }
}

#[derive(Clone)]
pub struct CsvService {
    lead_repo: LeadRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl CsvService {
    pub fn new(lead_repo: LeadRepository, activity_repo: ActivityRepository, pool: PgPool) -> Self {
        Self {
            lead_repo,
            activity_repo,
            pool,
        }
    }

    /// Importa leads de um CSV. Cada linha é salva na própria transação:
    /// linhas ruins entram em `errors` e as demais seguem normalmente.
    pub async fn import(&self, data: &[u8], user: &User) -> Result<ImportLeadsResponse, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data);

        let headers = reader.headers()?.clone();

        let mut imported = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for (i, result) in reader.records().enumerate() {
            // Linha 1 é o cabeçalho, então os dados começam na 2
            let row = i + 2;

            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    errors.push(format!("Row {}: {}", row, err));
                    continue;
                }
            };

            let payload = match parse_row(&headers, &record) {
                Ok(payload) => payload,
                Err(msg) => {
                    errors.push(format!("Row {}: {}", row, msg));
                    continue;
                }
            };

            match self.save_row(&payload, user).await {
                Ok(()) => imported += 1,
                Err(err) => {
                    tracing::warn!("Falha ao importar a linha {}: {}", row, err);
                    errors.push(format!("Row {}: failed to save lead", row));
                }
            }
        }

        Ok(ImportLeadsResponse {
            success: true,
            imported,
            errors,
        })
    }

    async fn save_row(&self, payload: &CreateLeadPayload, user: &User) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self
            .lead_repo
            .insert(
                &mut *tx,
                &payload.name,
                &payload.phone,
                &payload.email,
                &payload.interest,
                payload.source,
                payload.funnel_day.unwrap_or(0),
                payload.status.unwrap_or(LeadStatus::Warm),
                payload.next_action.as_deref(),
                payload.next_action_date,
                payload.tags.as_deref().unwrap_or(&[]),
                payload.notes.as_deref().unwrap_or(""),
                payload.assigned_to,
            )
            .await?;

        self.activity_repo
            .insert(
                &mut *tx,
                lead.id,
                ActivityType::Note,
                "Lead imported from CSV",
                user.id,
                &user.name,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gera o CSV de export. Quando `ids` vem preenchido, exporta exatamente
    /// esses leads e ignora os demais filtros.
    pub async fn export(&self, query: &ExportLeadsQuery) -> Result<Vec<u8>, AppError> {
        let leads = match parse_ids(query.ids.as_deref()) {
            Some(ids) => self.lead_repo.list_by_ids(&self.pool, &ids).await?,
            None => {
                self.lead_repo
                    .list_for_export(&self.pool, query.status, query.source, query.funnel_day)
                    .await?
            }
        };

        leads_to_csv(&leads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::models::auth::UserRole;

    fn read(csv_text: &str) -> (StringRecord, Vec<StringRecord>) {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let records = reader.records().map(|r| r.unwrap()).collect();
        (headers, records)
    }

    #[test]
    fn parse_row_with_lowercase_headers() {
        let (headers, records) = read(
            "name,phone,email,interest,source,funnelDay,status,tags,notes,nextAction\n\
             Rajesh Kumar,+91 98765 43210,RAJESH@Email.com,Options Trading,Website,3,Hot,\"vip, nri\",Wants tips,Call back",
        );

        let payload = parse_row(&headers, &records[0]).unwrap();
        assert_eq!(payload.name, "Rajesh Kumar");
        assert_eq!(payload.email, "rajesh@email.com");
        assert_eq!(payload.source, LeadSource::Website);
        assert_eq!(payload.funnel_day, Some(3));
        assert_eq!(payload.status, Some(LeadStatus::Hot));
        assert_eq!(payload.tags, Some(vec!["vip".to_string(), "nri".to_string()]));
        assert_eq!(payload.next_action.as_deref(), Some("Call back"));
    }

    #[test]
    fn parse_row_with_title_case_headers_and_defaults() {
        let (headers, records) = read(
            "Name,Phone,Email\n\
             Priya,+91 91234 56789,priya@email.com",
        );

        let payload = parse_row(&headers, &records[0]).unwrap();
        assert_eq!(payload.interest, "General");
        assert_eq!(payload.source, LeadSource::Other);
        assert_eq!(payload.funnel_day, Some(0));
        assert_eq!(payload.status, Some(LeadStatus::Warm));
        assert_eq!(payload.tags, Some(vec![]));
        assert_eq!(payload.notes.as_deref(), Some(""));
    }

    #[test]
    fn parse_row_missing_name_fails() {
        let (headers, records) = read("phone,email\n123,a@b.c");
        assert_eq!(
            parse_row(&headers, &records[0]).unwrap_err(),
            "name is required"
        );
    }

    #[test]
    fn parse_row_invalid_source_fails() {
        let (headers, records) = read(
            "name,phone,email,source\nAna,123,a@b.c,Facebook",
        );
        assert_eq!(
            parse_row(&headers, &records[0]).unwrap_err(),
            "invalid source 'Facebook'"
        );
    }

    #[test]
    fn parse_row_funnel_day_out_of_range_fails() {
        let (headers, records) = read("name,phone,email,funnelDay\nAna,123,a@b.c,9");
        assert_eq!(
            parse_row(&headers, &records[0]).unwrap_err(),
            "funnel day must be between 0 and 7"
        );

        let (headers, records) = read("name,phone,email,funnelDay\nAna,123,a@b.c,abc");
        assert_eq!(
            parse_row(&headers, &records[0]).unwrap_err(),
            "invalid funnel day 'abc'"
        );
    }

    #[test]
    fn export_produces_expected_columns() {
        let created = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        let lead = Lead {
            id: Uuid::nil(),
            name: "Rajesh Kumar".into(),
            phone: "+91 98765 43210".into(),
            email: "rajesh@email.com".into(),
            interest: "Options Trading".into(),
            source: LeadSource::Website,
            funnel_day: 3,
            status: LeadStatus::Hot,
            next_action: Some("Follow up call".into()),
            next_action_date: None,
            tags: vec!["vip".into(), "nri".into()],
            notes: "Wants weekly tips".into(),
            assigned_to: None,
            last_contacted_at: None,
            created_at: created,
            updated_at: created,
        };

        let bytes = leads_to_csv(&[lead]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let expected = "\
Name,Phone,Email,Interest,Source,Funnel Day,Status,Tags,Notes,Next Action,Created At,Last Contacted\n\
Rajesh Kumar,+91 98765 43210,rajesh@email.com,Options Trading,Website,3,Hot,\"vip, nri\",Wants weekly tips,Follow up call,2025-01-15T10:30:00.000Z,\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn export_filename_carries_the_date() {
        let name = export_filename();
        assert!(name.starts_with("leads-export-"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn parse_ids_skips_garbage() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{}, not-a-uuid ,{}", a, b);

        assert_eq!(parse_ids(Some(&raw)), Some(vec![a, b]));
        assert_eq!(parse_ids(Some("garbage")), None);
        assert_eq!(parse_ids(None), None);
    }

    // Pool preguiçoso: nunca abre conexão, e linhas inválidas não chegam
    // ao banco, então o fluxo de erro roda inteiro sem Postgres
    fn lazy_service() -> CsvService {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        CsvService::new(
            LeadRepository::new(pool.clone()),
            ActivityRepository::new(pool.clone()),
            pool,
        )
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Himanshu".into(),
            email: "admin@bigbull.com".into(),
            password_hash: String::new(),
            role: UserRole::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn import_numbers_rows_counting_the_header() {
        // Linha 1 é o cabeçalho; os dados começam na linha 2
        let csv = "name,phone,email,source\n\
                   ,123,a@b.c,Website\n\
                   Ana,123,a@b.c,Facebook\n";

        let response = lazy_service()
            .import(csv.as_bytes(), &sample_user())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.imported, 0);
        assert_eq!(
            response.errors,
            vec![
                "Row 2: name is required".to_string(),
                "Row 3: invalid source 'Facebook'".to_string(),
            ]
        );
    }
}

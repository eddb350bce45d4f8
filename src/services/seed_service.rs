// src/services/seed_service.rs

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, LeadRepository, TemplateRepository, UserRepository},
    models::{
        activity::ActivityType,
        auth::{SeedCredentialPair, SeedCredentials, SeedResponse, UserRole},
        lead::{LeadSource, LeadStatus},
        template::TemplateKind,
    },
};

const ADMIN_NAME: &str = "Himanshu";
const ADMIN_EMAIL: &str = "admin@bigbull.com";
const ADMIN_PASSWORD: &str = "admin123";

const AGENT_NAME: &str = "Sales Agent";
const AGENT_EMAIL: &str = "agent@bigbull.com";
const AGENT_PASSWORD: &str = "agent123";

struct SampleLead {
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    interest: &'static str,
    source: LeadSource,
    funnel_day: i16,
    status: LeadStatus,
    next_action: &'static str,
    tags: &'static [&'static str],
    notes: &'static str,
}

const SAMPLE_LEADS: [SampleLead; 10] = [
    SampleLead {
        name: "Rajesh Kumar",
        phone: "+91 98765 43210",
        email: "rajesh.kumar@email.com",
        interest: "Stock Market Basics",
        source: LeadSource::Gmb,
        funnel_day: 0,
        status: LeadStatus::Hot,
        next_action: "Send welcome message",
        tags: &["new", "interested"],
        notes: "Enquired about beginner course",
    },
    SampleLead {
        name: "Priya Sharma",
        phone: "+91 87654 32109",
        email: "priya.sharma@email.com",
        interest: "Options Trading",
        source: LeadSource::Ig,
        funnel_day: 2,
        status: LeadStatus::Warm,
        next_action: "Follow-up call",
        tags: &["options", "experienced"],
        notes: "Has some trading experience",
    },
    SampleLead {
        name: "Amit Patel",
        phone: "+91 76543 21098",
        email: "amit.patel@email.com",
        interest: "Technical Analysis",
        source: LeadSource::WalkIn,
        funnel_day: 5,
        status: LeadStatus::Hot,
        next_action: "Schedule demo",
        tags: &["technical", "serious"],
        notes: "Visited academy, very interested",
    },
    SampleLead {
        name: "Sneha Reddy",
        phone: "+91 65432 10987",
        email: "sneha.reddy@email.com",
        interest: "Crypto Trading",
        source: LeadSource::Website,
        funnel_day: 1,
        status: LeadStatus::Warm,
        next_action: "Send course details",
        tags: &["crypto", "young"],
        notes: "Filled website form",
    },
    SampleLead {
        name: "Vikram Singh",
        phone: "+91 54321 09876",
        email: "vikram.singh@email.com",
        interest: "Intraday Trading",
        source: LeadSource::Referral,
        funnel_day: 7,
        status: LeadStatus::Cold,
        next_action: "Final follow-up",
        tags: &["intraday", "referred"],
        notes: "Referred by Rajesh",
    },
    SampleLead {
        name: "Ananya Gupta",
        phone: "+91 43210 98765",
        email: "ananya.gupta@email.com",
        interest: "Stock Market Basics",
        source: LeadSource::Ig,
        funnel_day: 3,
        status: LeadStatus::Hot,
        next_action: "Send payment link",
        tags: &["new", "ready"],
        notes: "Ready to enroll",
    },
    SampleLead {
        name: "Rohit Mehta",
        phone: "+91 32109 87654",
        email: "rohit.mehta@email.com",
        interest: "Futures Trading",
        source: LeadSource::Gmb,
        funnel_day: 4,
        status: LeadStatus::Warm,
        next_action: "Address queries",
        tags: &["futures", "queries"],
        notes: "Has questions about course",
    },
    SampleLead {
        name: "Kavita Joshi",
        phone: "+91 21098 76543",
        email: "kavita.joshi@email.com",
        interest: "Portfolio Management",
        source: LeadSource::WalkIn,
        funnel_day: 6,
        status: LeadStatus::Warm,
        next_action: "Send testimonials",
        tags: &["portfolio", "professional"],
        notes: "Working professional",
    },
    SampleLead {
        name: "Suresh Iyer",
        phone: "+91 10987 65432",
        email: "suresh.iyer@email.com",
        interest: "Options Trading",
        source: LeadSource::Referral,
        funnel_day: 2,
        status: LeadStatus::Cold,
        next_action: "Re-engage",
        tags: &["options", "busy"],
        notes: "Was busy, try again",
    },
    SampleLead {
        name: "Meera Krishnan",
        phone: "+91 09876 54321",
        email: "meera.krishnan@email.com",
        interest: "Technical Analysis",
        source: LeadSource::Website,
        funnel_day: 0,
        status: LeadStatus::Hot,
        next_action: "Welcome call",
        tags: &["technical", "eager"],
        notes: "Just signed up, very eager",
    },
];

struct SampleTemplate {
    name: &'static str,
    day: i16,
    subject: &'static str,
    content: &'static str,
}

const SAMPLE_TEMPLATES: [SampleTemplate; 8] = [
    SampleTemplate {
        name: "Day 0 - Welcome",
        day: 0,
        subject: "Welcome to Bigbull Trading Academy!",
        content: "Hi {name}! Welcome to Bigbull Trading Academy. I am Himanshu, and I will personally guide you on your trading journey. I see you are interested in {interest}. Let me know the best time to discuss your learning goals!",
    },
    SampleTemplate {
        name: "Day 1 - Introduction",
        day: 1,
        subject: "Your Trading Journey Begins",
        content: "Hello {name}! Hope you had time to think about your trading goals. At Bigbull Academy, we have helped 500+ students become profitable traders. Would you like to know more about our {interest} course?",
    },
    SampleTemplate {
        name: "Day 2 - Course Details",
        day: 2,
        subject: "Course Details for {interest}",
        content: "Hi {name}! Here are the details for our {interest} course: 12 weeks comprehensive training, live market sessions, 1-on-1 mentoring, and lifetime access to our trading community. Interested in a free demo?",
    },
    SampleTemplate {
        name: "Day 3 - Success Stories",
        day: 3,
        subject: "Success Stories from Our Students",
        content: "Hey {name}! Want to see what our students have achieved? Check out these success stories from traders just like you who started with zero knowledge. Reply YES to receive video testimonials!",
    },
    SampleTemplate {
        name: "Day 4 - Free Resources",
        day: 4,
        subject: "Free Trading Resources",
        content: "Hi {name}! As a thank you for your interest, here are some free resources to get you started: Our Trading Basics PDF, Top 10 Chart Patterns guide, and a Risk Management checklist. Let me know if helpful!",
    },
    SampleTemplate {
        name: "Day 5 - Special Offer",
        day: 5,
        subject: "Exclusive Offer for You",
        content: "Hello {name}! I have a special offer just for you - Enroll in our {interest} course this week and get 20% off plus bonus 1-on-1 strategy session worth Rs 5000. Limited slots available!",
    },
    SampleTemplate {
        name: "Day 6 - Last Chance",
        day: 6,
        subject: "Offer Ending Soon",
        content: "Hi {name}! Just a reminder - the special 20% discount on {interest} course expires tomorrow. Don't miss this opportunity to transform your trading career. Call me at your convenience!",
    },
    SampleTemplate {
        name: "Day 7 - Final Follow-up",
        day: 7,
        subject: "Still Interested?",
        content: "Hey {name}! I understand everyone has different timelines. If now isn't the right time, no worries! Just reply whenever you're ready to discuss {interest}. We'll be here to help. Best, Himanshu - Bigbull Academy",
    },
];

#[derive(Clone)]
pub struct SeedService {
    user_repo: UserRepository,
    lead_repo: LeadRepository,
    activity_repo: ActivityRepository,
    template_repo: TemplateRepository,
    pool: PgPool,
}

impl SeedService {
    pub fn new(
        user_repo: UserRepository,
        lead_repo: LeadRepository,
        activity_repo: ActivityRepository,
        template_repo: TemplateRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            lead_repo,
            activity_repo,
            template_repo,
            pool,
        }
    }

    /// Popula o banco com os dados de demonstração. Idempotente: cada bloco
    /// (usuários, leads, templates) só roda se a tabela estiver vazia, e
    /// tudo acontece numa única transação.
    pub async fn run(&self) -> Result<SeedResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Usuários demo
        let admin = if self.user_repo.count(&mut *tx).await? == 0 {
            let (admin_hash, agent_hash) = tokio::task::spawn_blocking(|| {
                let admin = hash(ADMIN_PASSWORD, bcrypt::DEFAULT_COST)?;
                let agent = hash(AGENT_PASSWORD, bcrypt::DEFAULT_COST)?;
                Ok::<_, bcrypt::BcryptError>((admin, agent))
            })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

            let admin = self
                .user_repo
                .create_user(&mut *tx, ADMIN_NAME, ADMIN_EMAIL, &admin_hash, UserRole::Admin)
                .await?;
            self.user_repo
                .create_user(&mut *tx, AGENT_NAME, AGENT_EMAIL, &agent_hash, UserRole::Agent)
                .await?;

            tracing::info!("✅ Usuários demo criados");
            Some(admin)
        } else {
            self.user_repo.find_first_admin(&mut *tx).await?
        };

        // Autor das atividades do seed. Sem nenhum admin na base,
        // fica o marcador neutro "System".
        let (author_id, author_name) = admin
            .as_ref()
            .map(|u| (u.id, u.name.as_str()))
            .unwrap_or((Uuid::nil(), "System"));

        // 2. Leads de exemplo, cada um com sua atividade de criação
        if self.lead_repo.count_all(&mut *tx).await? == 0 {
            for sample in SAMPLE_LEADS.iter() {
                let tags: Vec<String> = sample.tags.iter().map(|t| t.to_string()).collect();

                let lead = self
                    .lead_repo
                    .insert(
                        &mut *tx,
                        sample.name,
                        sample.phone,
                        sample.email,
                        sample.interest,
                        sample.source,
                        sample.funnel_day,
                        sample.status,
                        Some(sample.next_action),
                        None,
                        &tags,
                        sample.notes,
                        None,
                    )
                    .await?;

                self.activity_repo
                    .insert(
                        &mut *tx,
                        lead.id,
                        ActivityType::Note,
                        "Lead created (seed data)",
                        author_id,
                        author_name,
                    )
                    .await?;
            }
            tracing::info!("✅ {} leads de exemplo criados", SAMPLE_LEADS.len());
        }

        // 3. Sequência de follow-up (dias 0 a 7)
        if self.template_repo.count_all(&mut *tx).await? == 0 {
            for sample in SAMPLE_TEMPLATES.iter() {
                self.template_repo
                    .insert(
                        &mut *tx,
                        sample.name,
                        sample.day,
                        sample.subject,
                        sample.content,
                        TemplateKind::Whatsapp,
                        true,
                    )
                    .await?;
            }
            tracing::info!("✅ {} templates de follow-up criados", SAMPLE_TEMPLATES.len());
        }

        tx.commit().await?;

        Ok(SeedResponse {
            success: true,
            message: "Database seeded successfully".to_string(),
            credentials: SeedCredentials {
                admin: SeedCredentialPair {
                    email: ADMIN_EMAIL.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                },
                agent: SeedCredentialPair {
                    email: AGENT_EMAIL.to_string(),
                    password: AGENT_PASSWORD.to_string(),
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_data_respects_funnel_bounds() {
        assert_eq!(SAMPLE_LEADS.len(), 10);
        assert!(SAMPLE_LEADS.iter().all(|l| (0..=7).contains(&l.funnel_day)));
    }

    #[test]
    fn sample_templates_cover_every_funnel_day() {
        let days: Vec<i16> = SAMPLE_TEMPLATES.iter().map(|t| t.day).collect();
        assert_eq!(days, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }
}

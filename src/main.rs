use clap::Parser;
use clap::Subcommand;
use tracing::info;
use vedarag::config::AppConfig;
use vedarag::models::BirthData;
use vedarag::models::ChartPayload;
use vedarag::models::ChartType;
use vedarag::ChartRagService;
use vedarag::Result;

#[derive(Parser)]
#[command(name = "vedarag")]
#[command(about = "VedaRAG CLI for chart storage, retrieval, and personalized answers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile commands
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// Chart commands
    #[command(subcommand)]
    Chart(ChartCommands),
    /// Contact commands
    #[command(subcommand)]
    Contact(ContactCommands),
    /// Generate and index the core chart set for a user
    Onboard {
        /// User identifier
        user_id: String,
    },
    /// Retrieve chart chunks relevant to a query
    Query {
        /// User identifier
        user_id: String,
        /// The query text
        query: String,
    },
    /// Ask a question and get a chart-grounded answer
    Ask {
        /// User identifier
        user_id: String,
        /// The question text
        question: String,
    },
    /// Show store statistics
    Stats,
    /// Delete all data for a user
    Delete {
        /// User identifier
        user_id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create or update a profile
    Set {
        /// User identifier
        user_id: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Birth data as JSON
        #[arg(long)]
        birth_data: Option<String>,
    },
    /// Show a profile
    Show {
        /// User identifier
        user_id: String,
    },
}

#[derive(Subcommand)]
enum ChartCommands {
    /// Store one chart payload
    Store {
        /// User identifier
        user_id: String,
        /// Chart type tag, e.g. house-chart
        chart_type: String,
        /// Chart payload as JSON
        payload: String,
    },
    /// List stored charts
    List {
        /// User identifier
        user_id: String,
    },
    /// Synthesize documents for charts that have none yet
    Import {
        /// User identifier
        user_id: String,
    },
}

#[derive(Subcommand)]
enum ContactCommands {
    /// Add or update a contact
    Add {
        /// User identifier
        user_id: String,
        /// Contact name
        name: String,
        /// The contact's own user id, when they also have an account
        #[arg(long)]
        contact_user_id: Option<String>,
        /// Relationship type (defaults to friend)
        #[arg(long)]
        relationship: Option<String>,
        /// Birth data as JSON
        #[arg(long)]
        birth_data: Option<String>,
    },
    /// List contacts
    List {
        /// User identifier
        user_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    vedarag::logging::init_logging_with_config(Some(&config))?;
    info!("Configuration loaded successfully");

    let service = ChartRagService::new(&config).await?;

    match cli.command {
        Commands::Profile(command) => handle_profile_command(&service, command).await?,
        Commands::Chart(command) => handle_chart_command(&service, command).await?,
        Commands::Contact(command) => handle_contact_command(&service, command).await?,
        Commands::Onboard { user_id } => {
            println!("⏳ Onboarding {user_id}...");
            let outcome = service.onboard_user(&user_id).await?;
            println!(
                "✅ Generated {} charts ({}), imported documents for {} chart types",
                outcome.charts_generated,
                if outcome.degraded {
                    "fallback data"
                } else {
                    "upstream data"
                },
                outcome.documents_imported
            );
        }
        Commands::Query { user_id, query } => {
            println!("🔍 Query for {user_id}: \"{query}\"\n");
            let response = service.get_charts_for_query(&user_id, &query).await?;
            if response.status == "no-data" {
                println!("No chart data available for this user.");
                return Ok(());
            }
            println!("Found {} relevant chunks:", response.total_results);
            for (chart_type, chunks) in &response.charts {
                println!("\n📜 {chart_type}:");
                for chunk in chunks {
                    let preview: String = chunk.content.chars().take(80).collect();
                    println!("  - [{:.3}] {preview}", chunk.score);
                }
            }
        }
        Commands::Ask { user_id, question } => {
            println!("💭 Asking for {user_id}: \"{question}\"\n");
            let answer = service.answer_query(&user_id, &question, &[]).await?;
            println!("{}", "━".repeat(60));
            println!("{}", answer.text);
            println!("{}", "━".repeat(60));
            println!(
                "\nTrack: {:?} | Confidence: {:.1} | Degraded data: {}",
                answer.track, answer.confidence, answer.degraded
            );
        }
        Commands::Stats => {
            let stats = service.stats().await?;
            println!("📊 VedaRAG Statistics");
            println!("=====================");
            println!("  Profiles:       {}", stats.store.profiles);
            println!("  Charts:         {}", stats.store.charts);
            println!("  Documents:      {}", stats.store.documents);
            println!("  Contacts:       {}", stats.store.contacts);
            println!("  Cached indexes: {}", stats.cached_indexes);
        }
        Commands::Delete { user_id, force } => {
            if !force {
                println!("⚠️  This will delete ALL data for {user_id}!");
                println!("Are you sure you want to continue? (y/N)");
                let mut input = String::new();
                std::io::stdin().read_line(&mut input)?;
                if !input.trim().to_lowercase().starts_with('y') {
                    println!("Operation cancelled.");
                    return Ok(());
                }
            }
            service.delete_user_data(&user_id).await?;
            println!("✅ Deleted all data for {user_id}");
        }
    }

    Ok(())
}

fn parse_birth_data(raw: Option<&str>) -> Result<Option<BirthData>> {
    raw.map(|json| serde_json::from_str(json).map_err(Into::into))
        .transpose()
}

async fn handle_profile_command(
    service: &ChartRagService,
    command: ProfileCommands,
) -> Result<()> {
    match command {
        ProfileCommands::Set {
            user_id,
            name,
            birth_data,
        } => {
            let birth = parse_birth_data(birth_data.as_deref())?;
            let profile = service
                .store_profile(&user_id, name.as_deref(), birth.as_ref())
                .await?;
            println!("✅ Profile saved for {}", profile.user_id);
            if profile.has_birth_data() {
                println!("   Birth data on file. Run: vedarag onboard {user_id}");
            }
        }
        ProfileCommands::Show { user_id } => match service.get_profile(&user_id).await? {
            Some(profile) => {
                println!("👤 {}", profile.user_id);
                println!(
                    "   Name: {}",
                    profile.display_name.as_deref().unwrap_or("N/A")
                );
                match &profile.birth_data {
                    Some(birth) => println!(
                        "   Born: {}-{:02}-{:02} {:02}:{:02} ({})",
                        birth.year,
                        birth.month,
                        birth.day,
                        birth.hour,
                        birth.minute,
                        birth.place_of_birth.as_deref().unwrap_or("unknown place")
                    ),
                    None => println!("   No birth data"),
                }
                println!(
                    "   Updated: {}",
                    profile.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
            None => println!("No profile found for {user_id}"),
        },
    }
    Ok(())
}

async fn handle_chart_command(service: &ChartRagService, command: ChartCommands) -> Result<()> {
    match command {
        ChartCommands::Store {
            user_id,
            chart_type,
            payload,
        } => {
            let chart_type = ChartType::from(chart_type);
            let raw: serde_json::Value = serde_json::from_str(&payload)?;
            let payload = ChartPayload::from_stored(&chart_type, raw);
            let response = service
                .store_chart(&user_id, &chart_type, &payload, false)
                .await?;
            println!(
                "✅ Stored {} for {user_id}: {} documents",
                response.chart_type, response.document_count
            );
        }
        ChartCommands::List { user_id } => {
            let response = service.get_all_charts(&user_id).await?;
            println!("📜 {} chart records for {user_id}:", response.total_charts);
            for (chart_type, records) in &response.charts {
                println!("  {chart_type}:");
                for chart in records {
                    println!(
                        "    - #{} | degraded: {} | stored: {}",
                        chart.id,
                        chart.degraded,
                        chart.created_at.format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
            }
        }
        ChartCommands::Import { user_id } => {
            let response = service.import_existing_charts(&user_id).await?;
            println!(
                "✅ Imported documents for {} chart types",
                response.imported_count
            );
        }
    }
    Ok(())
}

async fn handle_contact_command(
    service: &ChartRagService,
    command: ContactCommands,
) -> Result<()> {
    match command {
        ContactCommands::Add {
            user_id,
            name,
            contact_user_id,
            relationship,
            birth_data,
        } => {
            let birth = parse_birth_data(birth_data.as_deref())?;
            let contact = service
                .store_contact(
                    &user_id,
                    &name,
                    contact_user_id.as_deref(),
                    relationship.as_deref(),
                    birth.as_ref(),
                )
                .await?;
            println!(
                "✅ Saved contact {} ({})",
                contact.contact_name, contact.relationship_type
            );
        }
        ContactCommands::List { user_id } => {
            let contacts = service.get_contacts(&user_id).await?;
            println!("👥 {} contacts for {user_id}:", contacts.len());
            for contact in &contacts {
                println!(
                    "  - {} ({}){}",
                    contact.contact_name,
                    contact.relationship_type,
                    if contact.birth_data.is_some() {
                        " | birth data on file"
                    } else {
                        ""
                    }
                );
            }
        }
    }
    Ok(())
}

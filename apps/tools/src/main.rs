use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use server_api::{
    check_delete, export_records, list_records, lookup_entity, ApiContext, ApiSettings,
};
use shared::{
    domain::{ExportFormat, RecordId},
    error::ApiError,
    metadata::{catalog, validate_catalog},
};
use storage::Storage;

/// Inspects the metadata catalog and the demo dataset.
#[derive(Parser, Debug)]
struct Cli {
    /// Start from an empty store instead of the demo records.
    #[arg(long)]
    empty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every entity with its label and record count.
    Entities,
    /// Field metadata of one entity.
    Describe { entity: String },
    List {
        entity: String,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Records that block deleting `id`.
    Dependencies { entity: String, id: String },
    Export {
        entity: String,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Comma separated field names.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },
    /// Fails when a foreign key or relationship names an unknown entity.
    CheckMetadata,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn api_error(err: ApiError) -> anyhow::Error {
    anyhow!(err.message)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = if cli.empty {
        Storage::empty()
    } else {
        Storage::seeded()
    };
    let ctx = ApiContext::new(storage, ApiSettings::default());

    match cli.command {
        Command::Entities => {
            let counts = ctx.storage.counts().await;
            for meta in catalog() {
                let count = counts.get(meta.name).copied().unwrap_or_default();
                println!("{:<24} {:<28} {count}", meta.name, meta.label);
            }
        }
        Command::Describe { entity } => {
            let meta = lookup_entity(&entity).map_err(api_error)?;
            println!("{} ({})", meta.label, meta.name);
            for field in meta.fields {
                let mut line = format!(
                    "  {:<28} {:<16} {:?}",
                    field.name, field.label, field.field_type
                );
                if field.required {
                    line.push_str(" required");
                }
                if let Some(target) = field.foreign_entity {
                    line.push_str(&format!(" -> {target}"));
                }
                if !field.options.is_empty() {
                    line.push_str(&format!(" [{}]", field.options.join(", ")));
                }
                println!("{line}");
            }
        }
        Command::List { entity, search } => {
            let records = list_records(&ctx, &entity, &search)
                .await
                .map_err(api_error)?;
            for record in &records {
                println!("{:<12} {}", record.id.as_str(), record.display_name());
            }
            println!("{} record(s)", records.len());
        }
        Command::Dependencies { entity, id } => {
            let check = check_delete(&ctx, &entity, &id).await.map_err(api_error)?;
            if !check.is_blocked() {
                println!("{} ({}) has no dependents", check.record_name, check.record_id);
            }
            for group in &check.dependencies {
                println!("{} via {}:", group.entity_name, group.field_name);
                for record in &group.records {
                    println!("  {:<12} {}", record.id.as_str(), record.name);
                }
            }
        }
        Command::Export {
            entity,
            format,
            columns,
            ids,
        } => {
            let format = match format {
                Format::Csv => ExportFormat::Csv,
                Format::Json => ExportFormat::Json,
            };
            let ids: Vec<RecordId> = ids.into_iter().map(RecordId::from).collect();
            let export = export_records(&ctx, &entity, &ids, &columns, format)
                .await
                .map_err(api_error)?;
            println!("{}", export.body.trim_end());
        }
        Command::CheckMetadata => {
            let issues = validate_catalog(catalog());
            for issue in &issues {
                eprintln!("{issue}");
            }
            if !issues.is_empty() {
                bail!("{} metadata issue(s)", issues.len());
            }
            println!("{} entities ok", catalog().len());
        }
    }

    Ok(())
}

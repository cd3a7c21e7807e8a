#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabel::{
    audit::{AuditContext, AuditLog},
    config::{TimesheetConfig, DEFAULT_CONFIG_JSON},
    io::{self, ExportFormat},
    model::{GroupTag, RosterTable, WorkerRecord},
    storage::write_atomic,
    validation::{ValidationRule, Validator},
    view::{self, Filter, SortKey},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de tabel de présence (gabarits de rotation, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Configuration JSON du roster (roster embarqué par défaut)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Utilisateur reporté dans le journal d'audit
    #[arg(long, global = true, default_value = "unknown")]
    user: String,

    /// Fichier du journal d'audit (désactivé par défaut)
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer le tabel et l'afficher
    Build {
        #[arg(long)]
        out_csv: Option<PathBuf>,
        #[arg(long)]
        out_json: Option<PathBuf>,
    },

    /// Lister avec filtres et tri
    List {
        /// Recherche dans le nom (insensible à la casse)
        #[arg(long)]
        search: Option<String>,
        /// Groupe(s) à garder (répétable)
        #[arg(long = "group")]
        groups: Vec<String>,
        /// Seulement les dépassements de norme
        #[arg(long)]
        overtime: bool,
        /// worker | group | fact | deviation | day:N
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        desc: bool,
    },

    /// Indicateurs clés
    Summary,

    /// Valider les cellules (tabel généré ou CSV édité)
    Validate {
        /// CSV édité à valider à la place du tabel généré
        #[arg(long)]
        table: Option<PathBuf>,
        /// Accepte aussi les heures (correction de la règle historique)
        #[arg(long)]
        corrected: bool,
    },

    /// Exporter le tabel sous un nom daté
    Export {
        /// csv | json | xlsx
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[arg(long, default_value = "timesheet")]
        prefix: String,
    },

    /// Écrire la configuration par défaut pour édition
    InitConfig {
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let ctx = AuditContext::new(cli.user.clone());
    let audit = cli
        .audit_log
        .as_ref()
        .map(AuditLog::to_file)
        .unwrap_or_else(AuditLog::disabled);

    if let Commands::InitConfig { out } = &cli.cmd {
        write_atomic(out, DEFAULT_CONFIG_JSON.as_bytes())?;
        println!("Default configuration written to {}", out.display());
        std::process::exit(0);
    }

    let config = TimesheetConfig::load_or_default(cli.config.as_ref())?;
    let table = config.build_table()?;

    let code = match cli.cmd {
        Commands::Build { out_csv, out_json } => {
            if let Some(path) = out_csv {
                io::export_table_csv(path, &table)?;
            }
            if let Some(path) = out_json {
                io::export_table_json(path, &table)?;
            }
            print_rows(table.rows.iter());
            0
        }
        Commands::List {
            search,
            groups,
            overtime,
            sort,
            desc,
        } => {
            let filter = Filter {
                search,
                groups: groups.into_iter().map(GroupTag::new).collect(),
                overtime_only: overtime,
            };
            let mut rows = filter.apply(&table);
            if let Some(key) = sort {
                view::sort_rows(&mut rows, key, desc);
            }
            print_rows(rows.into_iter());
            0
        }
        Commands::Summary => {
            let summary = view::summarize(&table.rows);
            println!("Workers: {}", summary.workers);
            match summary.average_fact {
                Some(avg) => println!("Average hours: {avg:.1}"),
                None => println!("Average hours: -"),
            }
            println!("Overtime: {}", summary.overtime);
            for (group, count) in &summary.per_group {
                println!("  {group}: {count}");
            }
            0
        }
        Commands::Validate {
            table: edited,
            corrected,
        } => {
            let validator = if corrected {
                Validator::new(config.markers.iter().cloned(), ValidationRule::HoursOrMarker)
            } else {
                config.validator()
            };
            let checked = match edited {
                Some(path) => {
                    let edited =
                        io::import_table_csv(&path, config.numeric_rule, config.norm_hours)
                            .with_context(|| format!("importing {}", path.display()))?;
                    audit_edits(&audit, &ctx, &table, &edited)?;
                    edited
                }
                None => table,
            };
            let diagnostics = validator.validate(&checked);
            if diagnostics.is_empty() {
                println!("OK: no invalid cells");
                0
            } else {
                eprintln!("Found {} invalid cell(s)", diagnostics.len());
                for d in &diagnostics {
                    println!("{d}");
                }
                // Code 2 = WARNING : le tabel reste utilisable
                2
            }
        }
        Commands::Export {
            format,
            dir,
            prefix,
        } => {
            let today = Local::now().date_naive();
            let path = io::export_table(&dir, &prefix, today, format, &table)?;
            audit.record(&ctx, &format!("export {}", format.extension()))?;
            println!("Exported {}", path.display());
            0
        }
        Commands::InitConfig { .. } => 0,
    };

    std::process::exit(code);
}

fn audit_edits(
    audit: &AuditLog,
    ctx: &AuditContext,
    generated: &RosterTable,
    edited: &RosterTable,
) -> Result<()> {
    let changes = view::diff(generated, edited);
    if !changes.is_empty() {
        audit.record(ctx, &format!("table edited: {} cell(s) changed", changes.len()))?;
    }
    Ok(())
}

fn print_rows<'a>(rows: impl Iterator<Item = &'a WorkerRecord>) {
    for row in rows {
        let days: Vec<String> = row
            .schedule()
            .cells()
            .iter()
            .map(|c| {
                let s = c.to_string();
                if s.is_empty() {
                    "-".to_string()
                } else {
                    s
                }
            })
            .collect();
        println!(
            "{} | {} | {} | {} | {}",
            row.worker,
            row.group,
            days.join(" "),
            row.fact_hours(),
            row.deviation()
        );
    }
}

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use claim_resubmission::{
    claims::{AlphaRecord, SourceRecord},
    cli::{Cli, Commands, SourceArgs},
    config::{Config, NormalizationPolicy},
    error::{self, PipelineError},
    resubmit::{ClaimPipeline, EligibilityChecker, PipelineRun},
    storage::ResultWriter,
    utils,
};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "claim_resubmission=debug,claim_resubmit=debug,info"
    } else {
        "claim_resubmission=info,claim_resubmit=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run { sources, output_dir, no_save } => {
            apply_overrides(&mut config, &sources);
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }
            run_pipeline(&config, no_save)
        }

        Commands::Scan { sources, detailed } => {
            apply_overrides(&mut config, &sources);
            scan_claims(&config, detailed)
        }

        Commands::Check { status, patient_id, denial_reason, submitted_at, as_of } => {
            if let Some(date) = as_of {
                config.pipeline.reference_date = Some(date);
            }
            let record = AlphaRecord {
                claim_id: Some("manual".to_string()),
                patient_id,
                procedure_code: None,
                denial_reason,
                status: Some(status),
                submitted_at: Some(submitted_at),
            };
            check_claim(&config, &record)
        }

        Commands::Init { force } => initialize(&config, Path::new(&cli.config), force),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn apply_overrides(config: &mut Config, args: &SourceArgs) {
    if let Some(path) = &args.alpha {
        config.sources.alpha_path = path.clone();
    }
    if let Some(path) = &args.beta {
        config.sources.beta_path = path.clone();
    }
    if let Some(date) = args.as_of {
        config.pipeline.reference_date = Some(date);
    }
    if args.skip_invalid {
        config.pipeline.on_normalization_error = NormalizationPolicy::Skip;
    }
}

fn execute(config: &Config) -> error::Result<PipelineRun> {
    let today = config.reference_date();
    info!(
        "Processing {} and {}",
        config.sources.alpha_path.display(),
        config.sources.beta_path.display()
    );
    ClaimPipeline::from_config(config).run(&config.sources, today)
}

fn run_pipeline(config: &Config, no_save: bool) -> error::Result<()> {
    let run = execute(config)?;

    if !no_save {
        ResultWriter::from_config(&config.output).save(&run)?;
    }

    println!("{}", serde_json::to_string_pretty(&run.summary)?);
    Ok(())
}

fn scan_claims(config: &Config, detailed: bool) -> error::Result<()> {
    println!("{}", "Scanning claims for resubmission...".cyan());
    let run = execute(config)?;

    println!("Reference date: {}", config.reference_date());
    run.summary.print_summary();

    if detailed && !run.candidates.is_empty() {
        println!("\n{}", "Resubmission candidates:".green());
        utils::print_table_border(100);
        utils::print_table_row(&["Claim", "Source", "Reason", "Recommended changes"], &[12, 8, 28, 44]);
        utils::print_table_border(100);
        for candidate in &run.candidates {
            utils::print_table_row(
                &[
                    &candidate.claim_id,
                    candidate.source_system.as_str(),
                    &utils::truncate(&utils::format_optional(candidate.resubmission_reason.as_deref()), 28),
                    &utils::format_optional(candidate.recommended_changes.as_deref()),
                ],
                &[12, 8, 28, 44],
            );
        }
        utils::print_table_border(100);
    }

    if detailed && !run.rejected.is_empty() {
        println!("\n{}", "Rejected claims:".yellow());
        utils::print_table_border(100);
        utils::print_table_row(&["Claim", "Source", "Status", "Patient", "Submitted", "Denial reason"], &[12, 8, 10, 10, 12, 40]);
        utils::print_table_border(100);
        for record in &run.rejected {
            utils::print_table_row(
                &[
                    &record.claim_id,
                    record.source_system.as_str(),
                    &record.status,
                    &utils::format_optional(record.patient_id.as_deref()),
                    &record.submitted_at,
                    &utils::truncate(&utils::format_optional(record.denial_reason.as_deref()), 40),
                ],
                &[12, 8, 10, 10, 12, 40],
            );
        }
        utils::print_table_border(100);
    }

    Ok(())
}

fn check_claim(config: &Config, raw: &AlphaRecord) -> error::Result<()> {
    let record = raw.normalize()?;
    let today = config.reference_date();
    let checker = EligibilityChecker::new(config.pipeline.min_age_days);

    let verdict = checker.classify(&record, today);
    println!("Eligibility: {}", checker.explain(&record, today));

    if verdict.eligible {
        println!("{}", "✓ Eligible for resubmission".green());
    } else {
        println!("{}", "✗ Not eligible for resubmission".red());
    }
    println!("Reason:         {}", utils::format_optional(verdict.reason.as_deref()));
    println!("Recommendation: {}", utils::format_optional(verdict.recommendation.as_deref()));
    Ok(())
}

fn initialize(config: &Config, path: &Path, force: bool) -> error::Result<()> {
    let path: PathBuf = if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("toml")
    };

    if path.exists() && !force {
        return Err(PipelineError::Config(format!(
            "{} already exists, pass --force to overwrite",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    std::fs::write(&path, config.to_toml()?).map_err(|e| PipelineError::io(&path, e))?;

    println!("{}", format!("✓ Configuration written to {}", path.display()).green());
    println!("\n{}", "Configuration:".cyan());
    println!("  Alpha source:   {}", config.sources.alpha_path.display());
    println!("  Beta source:    {}", config.sources.beta_path.display());
    println!("  Min age:        {} days", config.pipeline.min_age_days);
    println!("  Invalid rows:   {:?}", config.pipeline.on_normalization_error);
    println!("  Output dir:     {}", config.output.dir.display());

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to preview eligible claims", "claim-resubmit scan --detailed".yellow());
    println!("  {} to process and save results", "claim-resubmit run".yellow());
    Ok(())
}

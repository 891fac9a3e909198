use std::time::Instant;

use anyhow::Context;
use camaudit_common::config::Config;
use camaudit_common::models::device::DeviceRecord;
use camaudit_common::network::scope::Scope;
use camaudit_core::catalog::{self, Catalog, NotionCatalog};
use camaudit_core::discovery::ShodanSource;
use camaudit_core::probe::Prober;
use camaudit_core::scanner::Orchestrator;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

use crate::commands::SearchArgs;
use crate::mprint;
use crate::terminal::{format, print, progress::ScanProgress};

pub async fn search(args: SearchArgs, cfg: &Config) -> anyhow::Result<()> {
    let cfg = cfg.clone().with_workers(args.workers);
    let scope = Scope::parse(&args.scope).context("invalid --scope")?;

    let catalog = match (args.notion_token, args.database) {
        (Some(token), Some(database)) => Some(NotionCatalog::new(token, &database)?),
        (None, None) => None,
        _ => {
            warn!("Both --notion-token and --database are needed to save results, printing them instead");
            None
        }
    };

    let mut source = ShodanSource::new(args.shodan_key, args.query)?.within(&scope);
    info!("Searching for \"{}\"", source.query());

    let prober = Prober::new(&cfg, args.credential.into_credential())?.with_scope(scope);
    let orchestrator = Orchestrator::new(prober, &cfg);

    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone());

    let progress = ScanProgress::new();
    let start_time = Instant::now();
    let report = orchestrator
        .run(&mut source, &progress, &cancel)
        .instrument(progress.span().clone())
        .await?;

    mprint!();
    print::scan_summary(&report, start_time.elapsed());

    if report.matches.is_empty() {
        print::no_results();
        return Ok(());
    }

    match catalog {
        Some(catalog) => save(&catalog, &report.matches).await?,
        None => dump(&report.matches),
    }

    print::end_of_program();
    Ok(())
}

fn watch_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning devices still being checked...");
            cancel.cancel();
        }
    });
}

async fn save<C: Catalog>(catalog: &C, matches: &[DeviceRecord]) -> anyhow::Result<()> {
    print::header("synchronizing database");

    let mut idx = 0;
    let summary = catalog::synchronize(catalog, matches, |record, status| {
        print::sync_status(idx, record, status);
        if let Some(document) = format::synced_document(record, status) {
            println!("{document}");
        }
        idx += 1;
    })
    .await
    .context("failed to read existing catalog entries")?;

    print::sync_summary(&summary, matches.len());
    Ok(())
}

/// Prints every match, with its full document on stdout.
fn dump(matches: &[DeviceRecord]) {
    print::header("matches");

    for (idx, record) in matches.iter().enumerate() {
        format::print_record_tree(idx, record);
        println!("{}", record.to_pretty_json());
        if idx + 1 != matches.len() {
            mprint!();
        }
    }
}

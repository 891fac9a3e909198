use camaudit_common::config::Config;
use camaudit_core::probe::{ProbeOutcome, Prober};

use crate::commands::GetArgs;
use crate::terminal::{format, print};

pub async fn get(args: GetArgs, cfg: &Config) -> anyhow::Result<()> {
    let prober = Prober::new(cfg, args.credential.into_credential())?;

    match prober.probe(&args.target).await {
        ProbeOutcome::Matched(record) => {
            print::login_success(&record);
            format::print_record_tree(0, &record);
            println!("{}", record.to_pretty_json());
        }
        other => print::login_failure(&args.target.key(), &other.to_string()),
    }

    print::end_of_program();
    Ok(())
}

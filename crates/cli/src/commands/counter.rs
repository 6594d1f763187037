// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Counter command

use crate::output::{self, OutputFormat};
use clap::Args;
use keeper::{Actor, Config};
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Args)]
pub struct CounterArgs {
    /// Number of concurrent callers
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub callers: u32,
    /// Increments submitted by each caller
    #[arg(long, default_value = "100")]
    pub increments: u32,
    /// Submit without waiting for each increment to run
    #[arg(long = "async")]
    pub fire_and_forget: bool,
}

#[derive(Serialize)]
struct CounterReport {
    callers: u32,
    increments: u32,
    mode: &'static str,
    expected: u64,
    count: u64,
}

impl fmt::Display for CounterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} callers x {} increments ({})",
            self.callers, self.increments, self.mode
        )?;
        writeln!(f, "count: {}", self.count)
    }
}

pub async fn run(args: CounterArgs, config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let actor = Actor::start(0u64, config)?;

    let callers: Vec<_> = (0..args.callers)
        .map(|caller| {
            let actor = actor.clone();
            let fire_and_forget = args.fire_and_forget;
            let increments = args.increments;
            tokio::spawn(async move {
                for _ in 0..increments {
                    if fire_and_forget {
                        actor.execute_async(|count| *count += 1).await?;
                    } else {
                        actor.execute(|count| *count += 1).await?;
                    }
                }
                debug!(caller, "caller finished");
                Ok::<_, keeper::ActorError>(())
            })
        })
        .collect();
    for caller in callers {
        caller.await??;
    }

    // every accepted increment is queued ahead of this read
    let count = actor.query(|count| *count).await?;
    if let Some(err) = actor.shutdown().await {
        return Err(err.into());
    }

    let expected = u64::from(args.callers) * u64::from(args.increments);
    let report = CounterReport {
        callers: args.callers,
        increments: args.increments,
        mode: if args.fire_and_forget { "async" } else { "sync" },
        expected,
        count,
    };
    output::print(&report, format)?;

    if count != expected {
        anyhow::bail!("lost updates: expected {}, counted {}", expected, count);
    }
    Ok(())
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ping-pong command
//!
//! A ring of actors, each serving one ball. Every hit passes the ball to the
//! next actor in the ring until its rounds run out.

use crate::output::{self, OutputFormat};
use clap::Args;
use keeper::{Actor, Config};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Args)]
pub struct PingpongArgs {
    /// Number of actors in the ring
    #[arg(long, default_value = "4", value_parser = clap::value_parser!(u32).range(2..))]
    pub actors: u32,
    /// Hits per ball before it lands
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u64).range(1..))]
    pub rounds: u64,
    /// Give up if the balls have not all landed by then
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,
}

struct Player {
    hits: u64,
    next: Option<Actor<Player>>,
    runtime: Handle,
    landed: mpsc::UnboundedSender<usize>,
}

/// Count a hit and pass the ball on while rounds remain
fn hit(player: &mut Player, ball: usize, remaining: u64) {
    player.hits += 1;
    if remaining <= 1 {
        let _ = player.landed.send(ball);
        return;
    }
    let Some(next) = player.next.clone() else {
        let _ = player.landed.send(ball);
        return;
    };
    let landed = player.landed.clone();
    player.runtime.spawn(async move {
        if let Err(err) = next
            .execute_async(move |p| hit(p, ball, remaining - 1))
            .await
        {
            warn!(ball, error = %err, "ball dropped");
            let _ = landed.send(ball);
        }
    });
}

#[derive(Serialize)]
struct PingpongReport {
    actors: u32,
    rounds: u64,
    hits: Vec<u64>,
    total: u64,
}

impl fmt::Display for PingpongReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hits) in self.hits.iter().enumerate() {
            writeln!(f, "actor {:<4} hits {}", i, hits)?;
        }
        writeln!(f, "total hits: {}", self.total)
    }
}

pub async fn run(args: PingpongArgs, config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let (landed_tx, mut landed) = mpsc::unbounded_channel();
    let runtime = Handle::current();

    let mut ring = Vec::with_capacity(args.actors as usize);
    for _ in 0..args.actors {
        let player = Player {
            hits: 0,
            next: None,
            runtime: runtime.clone(),
            landed: landed_tx.clone(),
        };
        ring.push(Actor::start(player, config.clone())?);
    }
    drop(landed_tx);

    for (i, actor) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()].clone();
        actor.execute(move |p| p.next = Some(next)).await?;
    }

    let rounds = args.rounds;
    for (ball, actor) in ring.iter().enumerate() {
        actor.execute_async(move |p| hit(p, ball, rounds)).await?;
    }

    let deadline = Duration::from_secs(args.timeout_secs);
    let all_landed = async {
        for _ in 0..ring.len() {
            if let Some(ball) = landed.recv().await {
                debug!(ball, "ball landed");
            }
        }
    };
    if tokio::time::timeout(deadline, all_landed).await.is_err() {
        anyhow::bail!("balls still in play after {:?}", deadline);
    }

    let mut hits = Vec::with_capacity(ring.len());
    for actor in &ring {
        hits.push(actor.query(|p| p.hits).await?);
    }

    for actor in &ring {
        if let Some(err) = actor.shutdown().await {
            return Err(err.into());
        }
    }

    let report = PingpongReport {
        actors: args.actors,
        rounds: args.rounds,
        total: hits.iter().sum(),
        hits,
    };
    output::print(&report, format)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bank command

use crate::output::{self, OutputFormat};
use clap::Args;
use keeper::{Actor, Config};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct BankArgs {
    /// Opening balance
    #[arg(long, default_value = "100")]
    pub balance: u64,
    /// Amount to withdraw; repeat for several withdrawals in order
    #[arg(long = "withdraw")]
    pub withdrawals: Vec<u64>,
}

struct Account {
    balance: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("insufficient funds: balance {balance}, requested {requested}")]
struct InsufficientFunds {
    balance: u64,
    requested: u64,
}

#[derive(Serialize)]
struct Withdrawal {
    amount: u64,
    accepted: bool,
    balance: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct BankReport {
    opening: u64,
    withdrawals: Vec<Withdrawal>,
    closing: u64,
}

impl fmt::Display for BankReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "opening balance: {}", self.opening)?;
        for w in &self.withdrawals {
            match &w.error {
                None => writeln!(f, "withdraw {:<8} ok      balance {}", w.amount, w.balance)?,
                Some(error) => writeln!(f, "withdraw {:<8} refused {}", w.amount, error)?,
            }
        }
        writeln!(f, "closing balance: {}", self.closing)
    }
}

pub async fn run(args: BankArgs, config: Config, format: OutputFormat) -> anyhow::Result<()> {
    let actor = Actor::start(
        Account {
            balance: args.balance,
        },
        config,
    )?;

    let mut withdrawals = Vec::with_capacity(args.withdrawals.len());
    for amount in args.withdrawals {
        let outcome = actor
            .update(move |account: &mut Account| {
                if account.balance < amount {
                    return Err(InsufficientFunds {
                        balance: account.balance,
                        requested: amount,
                    });
                }
                account.balance -= amount;
                Ok(account.balance)
            })
            .await;

        let withdrawal = match outcome {
            Ok(balance) => Withdrawal {
                amount,
                accepted: true,
                balance,
                error: None,
            },
            Err(err) => match err.downcast_ref::<InsufficientFunds>() {
                Some(refused) => Withdrawal {
                    amount,
                    accepted: false,
                    balance: refused.balance,
                    error: Some(refused.to_string()),
                },
                None => return Err(err.into()),
            },
        };
        withdrawals.push(withdrawal);
    }

    let closing = actor.query(|account| account.balance).await?;
    if let Some(err) = actor.shutdown().await {
        return Err(err.into());
    }

    let report = BankReport {
        opening: args.balance,
        withdrawals,
        closing,
    };
    output::print(&report, format)
}

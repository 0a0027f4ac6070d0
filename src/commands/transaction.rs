//! Transaction command handlers.

use crate::args::{DeleteArgs, InsertArgs, ListArgs, UpdateArgs};
use crate::commands::{display_context, Out};
use crate::model::{Transaction, TransactionFilter};
use crate::{Config, Result};
use anyhow::bail;
use serde::Serialize;

/// Inserts a new transaction into the local SQLite database.
///
/// A unique transaction ID is generated automatically and returned on success. The
/// amount is recorded as entered; when `--original-currency` is given, the original
/// denomination is preserved alongside it.
pub async fn insert(config: Config, args: &InsertArgs) -> Result<Out<String>> {
    let transaction = Transaction::new(
        args.date(),
        args.description(),
        args.amount(),
        args.pillar(),
        args.account(),
        args.category(),
        args.tag(),
        args.original_currency().map(String::from),
        args.original_amount(),
    );
    config.db().insert_transaction(&transaction).await?;

    let id = transaction.id().to_string();
    let message = format!("Inserted transaction with ID: {id}");
    Ok(Out::new(message, id))
}

/// Modifies an existing transaction. Only the fields provided on the command line
/// change; everything else is preserved.
pub async fn update(config: Config, args: &UpdateArgs) -> Result<Out<Transaction>> {
    let Some(mut transaction) = config.db().get_transaction(args.id()).await? else {
        bail!("No transaction found with id '{}'", args.id());
    };

    if let Some(date) = args.date() {
        transaction.set_date(date);
    }
    if let Some(description) = args.description() {
        transaction.set_description(description.to_string());
    }
    if let Some(amount) = args.amount() {
        transaction.set_amount(amount);
    }
    if let Some(pillar) = args.pillar() {
        transaction.set_pillar(pillar);
    }
    if let Some(account) = args.account() {
        transaction.set_account(account.to_string());
    }
    if let Some(category) = args.category() {
        transaction.set_category(category.to_string());
    }
    if let Some(tag) = args.tag() {
        transaction.set_tag(tag.to_string());
    }

    config.db().update_transaction(&transaction).await?;
    let message = format!("Updated transaction {}", transaction.id());
    Ok(Out::new(message, transaction))
}

/// Deletes a transaction by id.
pub async fn delete(config: Config, args: &DeleteArgs) -> Result<Out<()>> {
    config.db().delete_transaction(args.id()).await?;
    Ok(format!("Deleted transaction {}", args.id()).into())
}

/// One listed transaction with its amount rendered in the display currency.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub pillar: String,
    pub amount: String,
    pub account: String,
    pub category: String,
    pub tag: String,
}

/// Lists transactions matching the given filters, with amounts converted to the
/// preferred display currency.
pub async fn list(config: Config, args: &ListArgs) -> Result<Out<Vec<TransactionRow>>> {
    let filter = TransactionFilter {
        category: args.category().map(String::from),
        tag: args.tag().map(String::from),
        start_date: args.start_date(),
        end_date: args.end_date(),
    };
    let transactions = config.db().transactions(&filter).await?;
    let ctx = display_context(&config).await;

    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|t| TransactionRow {
            id: t.id().to_string(),
            date: t.date().to_string(),
            description: t.description().to_string(),
            pillar: t.pillar().to_string(),
            amount: ctx.format(ctx.convert_transaction(t)),
            account: t.account().to_string(),
            category: t.category().to_string(),
            tag: t.tag().to_string(),
        })
        .collect();

    let mut lines = vec![format!(
        "{} transaction(s) in {}",
        rows.len(),
        ctx.currency()
    )];
    for row in &rows {
        let mut line = format!(
            "{}  {:>15}  {:<6}  {}",
            row.date, row.amount, row.pillar, row.description
        );
        if !row.category.is_empty() {
            line.push_str(&format!(" [{}]", row.category));
        }
        line.push_str(&format!("  ({})", row.id));
        lines.push(line);
    }

    Ok(Out::new(lines.join("\n"), rows))
}

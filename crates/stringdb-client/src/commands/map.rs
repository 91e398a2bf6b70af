//! `stringdb map` command implementation
//!
//! Resolves symbols through the API, or offline from the alias table.

use super::{parse_taxon, render_rows, Context};
use crate::error::Result;
use crate::mapping::{map_id, map_id_local, ResolutionPolicy};
use crate::progress;
use crate::tables::Table;
use crate::version;
use crate::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use stringdb_common::types::Identifier;

const ANNOTATION_WIDTH: usize = 60;

#[derive(Serialize)]
struct MappedSymbol<'a> {
    symbol: &'a str,
    string_id: &'a str,
}

/// Resolve through `/api/json/get_string_ids`
pub async fn run(ctx: &Context, taxon: &str, ids: &[String], limit: u32) -> Result<()> {
    let identifier = Identifier::new(parse_taxon(taxon)?, ids.iter().cloned());

    let mut client = ctx.client()?;
    if let Some(requested) = ctx.requested_version.as_deref() {
        client = version::bind(client, Some(requested)).await?.0;
    }

    let spinner = progress::create_spinner("Resolving identifiers");
    let matches = map_id(&client, &identifier, limit).await;
    spinner.finish_and_clear();
    let matches = matches?;

    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|m| {
            let query = m
                .query_item
                .clone()
                .or_else(|| ids.get(m.query_index).cloned())
                .unwrap_or_default();
            vec![
                query,
                m.string_id.clone(),
                m.preferred_name.clone(),
                shorten(&m.annotation, ANNOTATION_WIDTH),
            ]
        })
        .collect();

    print!(
        "{}",
        render_rows(ctx.format, &["Query", "STRING id", "Preferred name", "Annotation"], &rows, &matches)?
    );
    Ok(())
}

/// Resolve from the cached alias table, downloading it when needed
pub async fn run_local(ctx: &Context, taxon: &str, ids: &[String], strict: bool) -> Result<()> {
    let taxon = parse_taxon(taxon)?;
    let cache = ctx.tables()?;
    let aliases = cache.ensure(taxon, Table::Alias).await?;

    let policy = if strict {
        ResolutionPolicy::Strict
    } else {
        ResolutionPolicy::Warn
    };
    let mapping = map_id_local(&aliases, ids, policy)?;

    let records: Vec<MappedSymbol<'_>> = mapping
        .resolved
        .iter()
        .map(|(symbol, id)| MappedSymbol { symbol, string_id: id })
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.symbol.to_string(), r.string_id.to_string()])
        .collect();

    print!("{}", render_rows(ctx.format, &["Symbol", "STRING id"], &rows, &records)?);

    if ctx.format == OutputFormat::Table {
        println!(
            "Conversion rate: {} ({}/{})",
            format!("{:.2}", mapping.rate()).cyan(),
            mapping.resolved_count(),
            mapping.requested
        );
        if !mapping.unresolved.is_empty() {
            println!("{} Unresolved: {}", "!".yellow(), mapping.unresolved.join(", "));
        }
    }

    Ok(())
}

fn shorten(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

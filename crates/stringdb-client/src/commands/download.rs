//! `stringdb download` command implementation
//!
//! Fetches one bulk table into the cache directory.

use super::{parse_taxon, Context};
use crate::error::Result;
use crate::progress::format_bytes;
use crate::tables::Table;
use colored::Colorize;

pub async fn run(ctx: &Context, taxon: &str, table: &str) -> Result<()> {
    let taxon = parse_taxon(taxon)?;
    let table: Table = table.parse()?;
    let cache = ctx.tables()?;

    let path = cache.ensure(taxon, table).await?;
    let size = std::fs::metadata(&path)?.len();

    println!(
        "{} {}.{} ({})",
        "✓".green(),
        taxon,
        table.stem(cache.version()),
        format_bytes(size)
    );
    println!("  {}", path.display());

    Ok(())
}

//! `stringdb versions` command implementation
//!
//! Lists the published releases and marks the one the session would use.

use super::{render_rows, Context};
use crate::error::Result;
use crate::version;

pub async fn run(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let versions = version::discover(&client).await?;

    if versions.is_empty() {
        println!("No STRING releases published at {}", client.discovery_url());
        return Ok(());
    }

    let configured = ctx.config.string_version.as_str();
    let rows: Vec<Vec<String>> = versions
        .iter()
        .map(|v| {
            let marker = if v.string_version == configured { "*" } else { "" };
            vec![v.string_version.clone(), v.stable_address.clone(), marker.to_string()]
        })
        .collect();

    print!(
        "{}",
        render_rows(ctx.format, &["Version", "Address", "Configured"], &rows, &versions)?
    );

    Ok(())
}

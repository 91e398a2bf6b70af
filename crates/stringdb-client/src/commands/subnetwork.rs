//! `stringdb subnetwork` command implementation
//!
//! Loads the species' interaction table, extracts the subnetwork of the
//! given proteins and optionally drops homologous pairs and clusters it.

use super::{parse_taxon, render_rows, Context};
use crate::error::Result;
use crate::graph::{
    cluster, extract, homology_reference, remove_homologous_interactions, ClusterAlgorithm, Interaction, Partition,
    Subnetwork,
};
use crate::mapping::{map_id_local, ResolutionPolicy};
use crate::tables::Table;
use crate::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SubnetworkArgs {
    pub taxon: String,
    pub ids: Vec<String>,
    pub threshold: Option<f64>,
    pub cluster: Option<String>,
    pub remove_homologous: bool,
    pub min_bitscore: f64,
    pub symbols: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    vertices: usize,
    interactions: &'a [Interaction],
    dropped: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    homologous_removed: Option<usize>,
    components: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition: Option<&'a Partition>,
}

pub async fn run(ctx: &Context, args: &SubnetworkArgs) -> Result<()> {
    let taxon = parse_taxon(&args.taxon)?;
    let cache = ctx.tables()?;

    let (ids, labels): (Vec<String>, Option<HashMap<String, String>>) = if args.symbols {
        let aliases = cache.ensure(taxon, Table::Alias).await?;
        let mapping = map_id_local(&aliases, &args.ids, ResolutionPolicy::Warn)?;
        (mapping.string_ids(), Some(mapping.labels()))
    } else {
        (args.ids.clone(), None)
    };

    let links = cache.load_links(taxon).await?;
    let mut subnetwork = extract(&links, &ids, args.threshold, labels.as_ref())?;

    let mut removed = None;
    if args.remove_homologous {
        let homology = cache.load_homology(taxon, args.min_bitscore).await?;
        let reference = homology_reference(&homology, subnetwork.ids(), args.min_bitscore)?;
        let report = remove_homologous_interactions(&subnetwork, &reference);
        removed = Some(report.removed);

        // Continue with the filtered graph; vertices are unchanged.
        let names: Vec<String> = report.non_homologous.vertices().map(str::to_string).collect();
        let mut filtered = extract(&report.non_homologous, &names, None, None)?;
        filtered.interactions = report.remaining;
        filtered.dropped = std::mem::take(&mut subnetwork.dropped);
        subnetwork = filtered;
    }

    let partition = match &args.cluster {
        Some(name) => Some(cluster(&subnetwork, ClusterAlgorithm::from_name_or_default(name))?),
        None => None,
    };

    info!(
        vertices = subnetwork.graph.vertex_count(),
        interactions = subnetwork.interactions.len(),
        "Subnetwork ready"
    );
    print_report(ctx, &subnetwork, removed, partition.as_ref())
}

fn print_report(ctx: &Context, subnetwork: &Subnetwork, removed: Option<usize>, partition: Option<&Partition>) -> Result<()> {
    let report = Report {
        vertices: subnetwork.graph.vertex_count(),
        interactions: &subnetwork.interactions,
        dropped: &subnetwork.dropped,
        homologous_removed: removed,
        components: subnetwork.connected_components(),
        partition,
    };

    if ctx.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = subnetwork
        .interactions
        .iter()
        .map(|i| vec![i.source.clone(), i.target.clone(), format_score(i.score)])
        .collect();
    print!(
        "{}",
        render_rows(ctx.format, &["Source", "Target", "Score"], &rows, &subnetwork.interactions)?
    );

    if let Some(partition) = partition {
        let rows: Vec<Vec<String>> = partition
            .membership
            .iter()
            .map(|(vertex, community)| vec![vertex.clone(), community.to_string()])
            .collect();
        print!(
            "{}",
            render_rows(ctx.format, &["Protein", "Community"], &rows, &partition.membership)?
        );
    }

    if ctx.format == OutputFormat::Table {
        println!(
            "{} {} proteins, {} interactions, {} component(s)",
            "✓".green(),
            report.vertices,
            report.interactions.len(),
            report.components.len()
        );
        if let Some(removed) = removed {
            println!("  Homologous interactions removed: {}", removed);
        }
        if let Some(partition) = partition {
            println!(
                "  {} communities ({}), modularity {:.4}",
                partition.community_count(),
                partition.algorithm,
                partition.modularity
            );
        }
        if !report.dropped.is_empty() {
            println!("{} Not in the interaction table: {}", "!".yellow(), report.dropped.join(", "));
        }
    }

    Ok(())
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

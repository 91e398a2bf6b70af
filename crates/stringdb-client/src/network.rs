//! Network images and enrichment tables from the STRING API
//!
//! Both request builders start from an [`Identifier`] and keep a form body
//! with `species`, `identifiers` and `caller_identity`. Parameter calls add to
//! that body; every request posts it.

use crate::api::{endpoints, ApiClient, Form, PpiEnrichment, TsvTable};
use crate::colors::{ramp_positions, Ramp};
use crate::error::{ClientError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use stringdb_common::types::{join_values, Identifier, TaxonId};
use tracing::{debug, info, warn};

/// Font size the service uses when none is given
const DEFAULT_LABEL_FONT_SIZE: u32 = 12;

fn flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_string()
}

fn base_form(client: &ApiClient, identifier: &Identifier) -> Result<Form> {
    let mut form = Form::new();
    form.insert("species", identifier.species.to_string());
    form.insert("identifiers", identifier.serialize()?);
    form.insert("caller_identity", client.caller_identity().to_string());
    Ok(form)
}

// ============================================================================
// Image
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkType {
    #[default]
    Functional,
    Physical,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Functional => "functional",
            NetworkType::Physical => "physical",
        }
    }
}

/// Edge styling of rendered networks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetworkFlavor {
    #[default]
    Evidence,
    Confidence,
    Actions,
}

impl NetworkFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkFlavor::Evidence => "evidence",
            NetworkFlavor::Confidence => "confidence",
            NetworkFlavor::Actions => "actions",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub required_score: u32,
    pub network_type: NetworkType,
    pub network_flavor: NetworkFlavor,
    pub hide_disconnected_nodes: bool,
    pub flat_node_design: bool,
    pub center_node_labels: bool,
    pub label_font_size: u32,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            required_score: 400,
            network_type: NetworkType::default(),
            network_flavor: NetworkFlavor::default(),
            hide_disconnected_nodes: false,
            flat_node_design: false,
            center_node_labels: false,
            label_font_size: DEFAULT_LABEL_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    fn method_format(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "highres_image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkImage {
    Svg(String),
    Png(Vec<u8>),
}

/// One colored node of a halo upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaloColor {
    pub id: String,
    pub value: f64,
    pub color: String,
}

/// Rendered network request
pub struct Image<'a> {
    client: &'a ApiClient,
    identifier: Identifier,
    form: Form,
}

impl<'a> Image<'a> {
    pub fn new(client: &'a ApiClient, identifier: Identifier) -> Result<Self> {
        if identifier.len() > 150 {
            warn!(count = identifier.len(), "Large networks render poorly; consider fewer identifiers");
        }
        let form = base_form(client, &identifier)?;
        Ok(Self {
            client,
            identifier,
            form,
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn params(&mut self, params: &ImageParams) -> &mut Self {
        self.form.insert("required_score", params.required_score.to_string());
        self.form.insert("network_type", params.network_type.as_str().to_string());
        self.form.insert("network_flavor", params.network_flavor.as_str().to_string());
        self.form.insert("hide_disconnected_nodes", flag(params.hide_disconnected_nodes));
        self.form.insert("flat_node_design", flag(params.flat_node_design));
        self.form.insert("center_node_labels", flag(params.center_node_labels));
        if params.label_font_size != DEFAULT_LABEL_FONT_SIZE {
            self.form.insert("custom_label_font_size", params.label_font_size.to_string());
        } else {
            self.form.remove("custom_label_font_size");
        }
        self
    }

    /// Node colors from the identifier annotations.
    ///
    /// Positive values take the Reds ramp, the rest Blues. The colors are
    /// uploaded once; later [`plot`](Self::plot) calls reference the upload.
    pub async fn add_halo(&mut self) -> Result<Vec<HaloColor>> {
        let sig = self
            .identifier
            .sig
            .as_ref()
            .ok_or_else(|| ClientError::missing_annotation("add_halo needs per-identifier values (Identifier::sig)"))?;

        let (mut positive, mut negative) = (Vec::new(), Vec::new());
        for id in &self.identifier.ids {
            match sig.get(id) {
                Some(&v) if v > 0.0 => positive.push((id.clone(), v)),
                Some(&v) => negative.push((id.clone(), v)),
                None => debug!(id = %id, "No annotation value, node keeps default color"),
            }
        }
        if positive.is_empty() && negative.is_empty() {
            return Err(ClientError::missing_annotation("none of the identifiers has an annotation value"));
        }

        let mut halo = Vec::with_capacity(positive.len() + negative.len());
        for (group, ramp) in [(positive, Ramp::Reds), (negative, Ramp::Blues)] {
            let values: Vec<f64> = group.iter().map(|(_, v)| *v).collect();
            for ((id, value), x) in group.into_iter().zip(ramp_positions(&values)) {
                halo.push(HaloColor {
                    id,
                    value,
                    color: ramp.hex(x),
                });
            }
        }

        let mut payload = self.form.clone();
        payload.insert("identifiers", join_values(halo.iter().map(|h| h.id.as_str())));
        payload.insert("colors", join_values(halo.iter().map(|h| h.color.as_str())));

        let url = endpoints::payload_url(self.client.base_url());
        let payload_id = self.client.post_text_to(&url, &payload).await?;
        let payload_id = payload_id.trim().to_string();
        info!(nodes = halo.len(), payload_id = %payload_id, "Uploaded node colors");

        self.form.insert("internal_payload_id", payload_id);
        Ok(halo)
    }

    /// Render the network; with `save` the image is written there instead
    /// of returned.
    pub async fn plot(&self, format: ImageFormat, save: Option<&Path>) -> Result<Option<NetworkImage>> {
        let url = endpoints::method_url(self.client.base_url(), format.method_format(), "network");
        let image = match format {
            ImageFormat::Svg => NetworkImage::Svg(self.client.post_text_to(&url, &self.form).await?),
            ImageFormat::Png => NetworkImage::Png(self.client.post_bytes_to(&url, &self.form).await?),
        };

        match save {
            Some(path) => {
                match &image {
                    NetworkImage::Svg(svg) => std::fs::write(path, svg)?,
                    NetworkImage::Png(png) => std::fs::write(path, png)?,
                }
                info!(path = %path.display(), "Saved network image");
                Ok(None)
            },
            None => Ok(Some(image)),
        }
    }
}

// ============================================================================
// Enrichment
// ============================================================================

/// Term categories of `/api/tsv/enrichment`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Process,
    Component,
    Function,
    Keyword,
    Kegg,
    Reactome,
    Pfam,
    Smart,
    InterPro,
}

impl Category {
    /// Value of the `category` column; `None` for [`Category::All`]
    pub fn column_value(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Process => Some("Process"),
            Category::Component => Some("Component"),
            Category::Function => Some("Function"),
            Category::Keyword => Some("Keyword"),
            Category::Kegg => Some("KEGG"),
            Category::Reactome => Some("RCTM"),
            Category::Pfam => Some("Pfam"),
            Category::Smart => Some("SMART"),
            Category::InterPro => Some("InterPro"),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_value().unwrap_or("All"))
    }
}

impl FromStr for Category {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let category = match s.trim().to_ascii_lowercase().as_str() {
            "all" => Category::All,
            "process" => Category::Process,
            "component" => Category::Component,
            "function" => Category::Function,
            "keyword" => Category::Keyword,
            "kegg" => Category::Kegg,
            "rctm" | "reactome" => Category::Reactome,
            "pfam" => Category::Pfam,
            "smart" => Category::Smart,
            "interpro" => Category::InterPro,
            _ => return Err(ClientError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// Network, homology and enrichment tables for a set of proteins
pub struct Enrichment<'a> {
    client: &'a ApiClient,
    species: TaxonId,
    form: Form,
}

impl<'a> Enrichment<'a> {
    pub fn new(client: &'a ApiClient, identifier: &Identifier) -> Result<Self> {
        Ok(Self {
            client,
            species: identifier.species,
            form: base_form(client, identifier)?,
        })
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Confidence cutoff and statistical background for later requests
    pub fn params<S: AsRef<str>>(&mut self, required_score: u32, background: &[S]) -> &mut Self {
        self.form.insert("required_score", required_score.to_string());
        if background.is_empty() {
            self.form.remove("background_string_identifiers");
        } else {
            self.form
                .insert("background_string_identifiers", join_values(background));
        }
        self
    }

    /// Interactions among the query proteins
    pub async fn interaction(&self) -> Result<TsvTable> {
        self.client.post_tsv("network", &self.form).await
    }

    /// Every interaction partner of the query proteins
    pub async fn all_partner(&self, limit: Option<u32>) -> Result<TsvTable> {
        let mut form = self.form.clone();
        if let Some(limit) = limit {
            form.insert("limit", limit.to_string());
        }
        self.client.post_tsv("interaction_partners", &form).await
    }

    /// Pairwise sequence similarity within the query set
    pub async fn similarity(&self) -> Result<TsvTable> {
        self.client.post_tsv("homology", &self.form).await
    }

    /// Best hits in other species; the query species when `species` is empty
    pub async fn ortholog(&self, species: &[TaxonId]) -> Result<TsvTable> {
        let mut form = self.form.clone();
        let targets = if species.is_empty() {
            join_values([self.species.to_string()])
        } else {
            join_values(species.iter().map(|s| s.to_string()))
        };
        form.insert("species_b", targets);
        self.client.post_tsv("homology_best", &form).await
    }

    /// Functional enrichment, optionally narrowed to one category
    pub async fn functional(&self, category: Category) -> Result<TsvTable> {
        let mut table = self.client.post_tsv("enrichment", &self.form).await?;
        if let Some(wanted) = category.column_value() {
            table.retain_by("category", |c| c == wanted);
        }
        debug!(%category, terms = table.len(), "Functional enrichment");
        Ok(table)
    }

    /// Annotation terms of every query protein
    pub async fn functional_annotation(&self, allow_pubmed: bool) -> Result<TsvTable> {
        let mut form = self.form.clone();
        if allow_pubmed {
            form.insert("allow_pubmed", "1".to_string());
        }
        self.client.post_tsv("functional_annotation", &form).await
    }

    /// Whether the query set has more interactions than expected by chance
    pub async fn ppi(&self, required_score: Option<u32>) -> Result<PpiEnrichment> {
        let mut form = self.form.clone();
        if let Some(score) = required_score {
            form.insert("required_score", score.to_string());
        }
        let records: Vec<PpiEnrichment> = self.client.post_json("ppi_enrichment", &form).await?;
        records
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Other(anyhow::anyhow!("ppi_enrichment returned no records")))
    }
}

use crate::core::Row;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tabled::{
    settings::{Alignment, Style},
    Table, Tabled,
};

/// How rows are written.
#[derive(Copy, Clone, Debug, Default, clap::ValueEnum)]
pub enum Format {
    #[default]
    Table,
    Json,
}

/// A row's rendered text.
#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct Line {
    #[tabled(rename = "Network Policy")]
    network_policy: String,

    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    direction: String,

    #[tabled(rename = "Namespace")]
    namespace: String,

    #[tabled(rename = "Pods")]
    pods: String,

    #[tabled(rename = "Namespaces Selector")]
    namespaces_selector: String,

    #[tabled(rename = "Pods Selector")]
    pods_selector: String,

    #[tabled(rename = "IP Block")]
    ip_block: String,

    #[tabled(rename = "Ports")]
    ports: String,

    #[tabled(skip)]
    source_type: String,
}

// === impl Format ===

impl Format {
    pub fn write(&self, rows: &[Row], w: &mut impl Write) -> Result<()> {
        match self {
            Self::Table => writeln!(w, "{}", table(rows))?,
            Self::Json => {
                let lines = rows.iter().map(Line::from).collect::<Vec<_>>();
                serde_json::to_writer_pretty(&mut *w, &lines)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Renders rows as a bordered table, one line between each row.
pub fn table(rows: &[Row]) -> String {
    Table::new(rows.iter().map(Line::from))
        .with(Style::modern())
        .with(Alignment::center())
        .to_string()
}

// === impl Line ===

impl From<&Row> for Line {
    fn from(row: &Row) -> Self {
        Self {
            network_policy: row.policy.clone(),
            direction: row.direction.to_string(),
            namespace: row.namespace.clone(),
            pods: row.applies_to_field().to_string(),
            namespaces_selector: row.namespaces_field().to_string(),
            pods_selector: row.pods_field().to_string(),
            ip_block: row.ip_block_field().to_string(),
            ports: row.ports_field().to_string(),
            source_type: format!("{:?}", row.source_type()),
        }
    }
}

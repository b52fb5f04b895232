//! The liquid-cooling overview page.
//!
//! The page carries one status table per cooling unit, headed
//! `<site>-CDU-<n.n> STATUS`, and one rack matrix per compartment, headed
//! `ENERGY VALVE STATUS COMPARTMENT <letter>`. Status tables are label/value
//! pairs; rack matrices have one column per rack and one row per field.

use std::collections::BTreeMap;

use bdx_types::{RackField, RackFieldRecord, StatusField, StatusFieldRecord};
use regex::Regex;
use tracing::debug;

use crate::locate::{locate_all, Boundary, TableRegion};
use crate::text::{normalize_item, parse_value};

/// Default heading pattern of a CDU status table; capture 1 is the unit number.
pub const DEFAULT_CDU_MARKER: &str = r"CGK3A-CL-1\.04-CDU-(\d+\.\d+) STATUS";
/// Default heading pattern of a rack matrix; capture 1 is the compartment.
pub const DEFAULT_RACK_MARKER: &str = r"ENERGY VALVE STATUS COMPARTMENT ([A-Z]+)";

/// Header text that introduces a rack column.
const RACK_PREFIX: &str = "RACK ";

/// Normalized status-table labels and the field each one reports.
const STATUS_LABELS: &[(&str, StatusField)] = &[
    ("cdu_cooling", StatusField::Status),
    ("fws_flow", StatusField::FwsFlow),
    ("fws_temp_sup", StatusField::FwsTempSup),
    ("fws_temp_ret", StatusField::FwsTempRet),
    ("tcs_flow", StatusField::TcsFlow),
    ("tcs_temp_sup", StatusField::TcsTempSup),
    ("tcs_temp_ret", StatusField::TcsTempRet),
];

/// Normalized rack-matrix row labels and the field each one reports.
const RACK_LABELS: &[(&str, RackField)] = &[
    ("rack_liquid_cooling", RackField::RackLiquidCooling),
    ("tcs_flow", RackField::TcsFlow),
    ("tcs_delta_temp", RackField::TcsDeltaTemp),
    ("tcs_temp_supply", RackField::TcsTempSupply),
];

/// Look up the status field for a display label such as `FWS TEMP SUP`.
pub fn status_field(label: &str) -> Option<StatusField> {
    let key = normalize_item(label);
    STATUS_LABELS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, field)| *field)
}

/// Look up the rack field for a row label such as `TCS Delta Temp`.
pub fn rack_field(label: &str) -> Option<RackField> {
    let key = normalize_item(label);
    RACK_LABELS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, field)| *field)
}

/// Heading patterns used to find tables on the overview page.
#[derive(Debug, Clone)]
pub struct LiquidMarkers {
    pub cdu: Regex,
    pub rack: Regex,
}

impl LiquidMarkers {
    /// Compile custom heading patterns.
    pub fn new(cdu: &str, rack: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            cdu: Regex::new(cdu)?,
            rack: Regex::new(rack)?,
        })
    }
}

impl Default for LiquidMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_CDU_MARKER, DEFAULT_RACK_MARKER)
            .expect("default liquid markers are valid patterns")
    }
}

/// Everything parsed from the overview page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiquidRecords {
    pub statuses: Vec<StatusFieldRecord>,
    pub racks: Vec<RackFieldRecord>,
}

impl LiquidRecords {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.racks.is_empty()
    }
}

/// Parse every status table and rack matrix on the overview page.
///
/// Racks are aggregated across all compartments by identifier.
pub fn parse_overview(html: &str, markers: &LiquidMarkers) -> LiquidRecords {
    let mut statuses = Vec::new();
    for found in locate_all(html, &markers.cdu, Boundary::Table) {
        let name = format!("CDU_{}", found.capture.unwrap_or(found.marker));
        statuses.extend(parse_status_table(&found.region, &name));
    }

    let mut matrix = RackMatrix::default();
    for found in locate_all(html, &markers.rack, Boundary::Table) {
        debug!("Parsing rack matrix {:?}", found.marker);
        matrix.absorb(&found.region);
    }

    LiquidRecords {
        statuses,
        racks: matrix.into_records(),
    }
}

/// Parse one CDU status table.
///
/// Cells alternate label, value, label, value. Unknown labels are ignored,
/// and a field reported twice keeps its last value.
pub fn parse_status_table(region: &TableRegion<'_>, source_name: &str) -> Vec<StatusFieldRecord> {
    let mut fields: BTreeMap<StatusField, (f64, String)> = BTreeMap::new();

    for row in region.rows() {
        let cells = row.cells();
        for pair in cells.chunks_exact(2) {
            let label = pair[0].text();
            let Some(field) = status_field(&label) else {
                continue;
            };
            match parse_value(&pair[1].text()) {
                Ok(parsed) => {
                    fields.insert(field, parsed);
                }
                Err(e) => debug!("{} {} skipped: {}", source_name, field, e),
            }
        }
    }

    fields
        .into_iter()
        .map(|(field, (value, unit))| StatusFieldRecord {
            source_name: source_name.to_string(),
            field,
            value,
            unit,
        })
        .collect()
}

/// Rack readings aggregated by rack identifier, in first-seen order.
#[derive(Debug, Default)]
pub struct RackMatrix {
    racks: Vec<(String, BTreeMap<RackField, (f64, String)>)>,
}

impl RackMatrix {
    fn set(&mut self, rack: &str, field: RackField, value: f64, unit: String) {
        let fields = match self.racks.iter().position(|(id, _)| id == rack) {
            Some(idx) => &mut self.racks[idx].1,
            None => {
                self.racks.push((rack.to_string(), BTreeMap::new()));
                let last = self.racks.len() - 1;
                &mut self.racks[last].1
            }
        };
        fields.insert(field, (value, unit));
    }

    /// Read one matrix table: rack ids from the header, then one row per field.
    ///
    /// The row label is the first cell; the value for the i-th header rack
    /// sits in cell i + 1.
    pub fn absorb(&mut self, region: &TableRegion<'_>) {
        let rack_ids = match region.section(Boundary::Thead) {
            Ok(head) => header_racks(&head),
            Err(e) => {
                debug!("Rack matrix without header: {}", e);
                return;
            }
        };
        if rack_ids.is_empty() {
            return;
        }

        let body = match region.section(Boundary::Tbody) {
            Ok(body) => body,
            Err(e) => {
                debug!("Rack matrix without body: {}", e);
                return;
            }
        };

        for row in body.rows() {
            let cells = row.cells();
            let Some(label) = cells.first().map(|c| c.text()) else {
                continue;
            };
            let Some(field) = rack_field(&label) else {
                continue;
            };

            for (i, rack) in rack_ids.iter().enumerate() {
                let Some(cell) = cells.get(i + 1) else {
                    continue;
                };
                match parse_value(&cell.text()) {
                    Ok((value, unit)) => self.set(rack, field, value, unit),
                    Err(e) => debug!("Rack {} {} skipped: {}", rack, field, e),
                }
            }
        }
    }

    /// Flatten into one record per (rack, field).
    pub fn into_records(self) -> Vec<RackFieldRecord> {
        self.racks
            .into_iter()
            .flat_map(|(rack_number, fields)| {
                fields
                    .into_iter()
                    .map(move |(field, (value, unit))| RackFieldRecord {
                        rack_number: rack_number.clone(),
                        field,
                        value,
                        unit,
                    })
            })
            .collect()
    }
}

/// Rack identifiers declared by header cells, in column order.
fn header_racks(head: &TableRegion<'_>) -> Vec<String> {
    head.rows()
        .iter()
        .flat_map(|row| row.cells())
        .filter_map(|cell| {
            let text = cell.text();
            let idx = text.find(RACK_PREFIX)?;
            let id = text[idx + RACK_PREFIX.len()..].trim().to_string();
            (!id.is_empty()).then_some(id)
        })
        .collect()
}

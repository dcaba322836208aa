//! Rules workbook adapter.
//!
//! Parsing works on plain string tables so it can be tested without a workbook file;
//! [`load_excel`] only turns an `.xlsx` into those tables.

use crate::builder::PolicySetBuilder;
use crate::error::SourceError;
use crate::values::{address_from_parts, parse_enable, parse_port_range, split_members};
use calamine::{Reader, open_workbook_auto};
use camino::Utf8Path;
use flowcheck_domain::model::{PolicyRule, PolicySet, Protocol, ServiceEntry};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const SHEET_ADDRESS_OBJECT: &str = "Address Object";
pub const SHEET_ADDRESS_GROUP: &str = "Address Group";
pub const SHEET_SERVICE_OBJECT: &str = "Service Object";
pub const SHEET_SERVICE_GROUP: &str = "Service Group";
pub const SHEET_RULE: &str = "Rule";

/// Sheet name to rows of cell text. The first row of each sheet is its header.
pub type SheetTables = BTreeMap<String, Vec<Vec<String>>>;

/// Read every sheet of an `.xlsx`/`.xls`/`.ods` workbook into [`SheetTables`].
pub fn read_workbook(path: &Utf8Path) -> Result<SheetTables, SourceError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| SourceError::Workbook {
        path: path.to_string(),
        source,
    })?;

    let mut tables = SheetTables::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|source| SourceError::Workbook {
                path: path.to_string(),
                source,
            })?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        tables.insert(name, rows);
    }
    debug!(path = %path, sheets = tables.len(), "read workbook");
    Ok(tables)
}

/// Load a policy set from a rules workbook on disk.
pub fn load_excel(path: &Utf8Path) -> Result<PolicySet, SourceError> {
    parse_workbook(&read_workbook(path)?)
}

/// Build a policy set from workbook tables. Only the `Rule` sheet is required.
pub fn parse_workbook(tables: &SheetTables) -> Result<PolicySet, SourceError> {
    let mut builder = PolicySetBuilder::new("excel");

    if let Some(table) = Table::open(tables, SHEET_ADDRESS_OBJECT)? {
        let name = table.column("Object Name")?;
        let kind = table.column("Type")?;
        let first = table.column("Subnet/Start-IP")?;
        let second = table.column("Mask/End-IP")?;
        for row in table.rows() {
            let object_name = row.get(name);
            if object_name.is_empty() {
                continue;
            }
            builder.address(address_from_parts(
                object_name,
                row.get(kind),
                row.get(first),
                row.get(second),
            ));
        }
    }

    if let Some(table) = Table::open(tables, SHEET_ADDRESS_GROUP)? {
        let group = table.column("Group Name")?;
        let member = table.column("Member")?;
        for row in table.rows() {
            let group_name = row.get(group);
            if !group_name.is_empty() {
                builder.address_members(group_name, split_members(row.get(member)));
            }
        }
    }

    if let Some(table) = Table::open(tables, SHEET_SERVICE_OBJECT)? {
        let name = table.column("Service Name")?;
        let protocol = table.column("Protocol")?;
        let port = table.column("Port")?;
        for row in table.rows() {
            let service_name = row.get(name);
            if service_name.is_empty() {
                continue;
            }
            let entries = service_row_entries(&table, &row, row.get(protocol), row.get(port))?;
            builder.service_entries(service_name, entries);
        }
    }

    if let Some(table) = Table::open(tables, SHEET_SERVICE_GROUP)? {
        let group = table.column("Group Name")?;
        let member = table.column("Member")?;
        for row in table.rows() {
            let group_name = row.get(group);
            if !group_name.is_empty() {
                builder.service_members(group_name, split_members(row.get(member)));
            }
        }
    }

    let table = Table::open(tables, SHEET_RULE)?
        .ok_or_else(|| SourceError::MissingSheet(SHEET_RULE.to_string()))?;
    let seq = table.column("Seq")?;
    let enable = table.column("Enable")?;
    let source = table.column("Source")?;
    let destination = table.column("Destination")?;
    let service = table.column("Service")?;
    let action = table.column("Action")?;
    let id = table.column("ID")?;
    let comments = table.column("Comments")?;
    let name = table.optional_column("Name");
    let schedule = table.optional_column("Schedule");

    let mut rules = Vec::new();
    for (position, row) in table.rows().enumerate() {
        let seq_text = row.get(seq);
        let priority = if seq_text.is_empty() {
            i64::try_from(position + 1).unwrap_or(i64::MAX)
        } else {
            parse_seq(seq_text).ok_or_else(|| table.invalid(&row, "Seq", seq_text))?
        };
        let enabled =
            parse_enable(row.get(enable)).ok_or_else(|| table.invalid(&row, "Enable", row.get(enable)))?;
        let policy_id = match row.get(id) {
            "" => priority.to_string(),
            explicit => explicit.to_string(),
        };
        let comment = Some(row.get(comments).to_string()).filter(|c| !c.is_empty());

        rules.push(PolicyRule {
            policy_id,
            name: name.map(|c| row.get(c)).unwrap_or_default().to_string(),
            priority,
            source: split_members(row.get(source)),
            destination: split_members(row.get(destination)),
            services: split_members(row.get(service)),
            action: row.get(action).to_string(),
            enabled,
            schedule: schedule
                .map(|c| row.get(c))
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            comment,
        });
    }

    // Rules are evaluated in Seq order; rows sharing a Seq keep sheet order.
    rules.sort_by_key(|rule| rule.priority);
    for rule in rules {
        builder.policy(rule);
    }

    Ok(builder.finish())
}

/// Seq cells arrive as `3` or, from numeric cells, `3.0`.
fn parse_seq(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

fn service_row_entries(
    table: &Table<'_>,
    row: &Row<'_>,
    protocol: &str,
    ports: &str,
) -> Result<Vec<ServiceEntry>, SourceError> {
    match protocol.trim().to_ascii_uppercase().as_str() {
        "IP" | "ANY" | "ALL" => return Ok(vec![ServiceEntry::any()]),
        "ICMP" => return Ok(Vec::new()),
        _ => {}
    }
    let proto: Protocol = protocol
        .parse()
        .map_err(|_| table.invalid(row, "Protocol", protocol))?;
    split_members(ports)
        .iter()
        .map(|token| {
            parse_port_range(token)
                .map(|range| ServiceEntry::new(proto, range.start, range.end))
                .ok_or_else(|| table.invalid(row, "Port", token))
        })
        .collect()
}

struct Table<'a> {
    sheet: &'a str,
    header: BTreeMap<String, usize>,
    rows: &'a [Vec<String>],
}

struct Row<'a> {
    /// 1-based sheet row, header included.
    number: usize,
    cells: &'a [String],
}

impl Row<'_> {
    fn get(&self, column: usize) -> &str {
        self.cells.get(column).map(|c| c.trim()).unwrap_or_default()
    }
}

impl<'a> Table<'a> {
    fn open(tables: &'a SheetTables, sheet: &'static str) -> Result<Option<Self>, SourceError> {
        let Some(rows) = tables.get(sheet) else {
            if sheet != SHEET_RULE {
                debug!(sheet, "sheet absent; skipping");
            }
            return Ok(None);
        };
        let Some((header_row, body)) = rows.split_first() else {
            warn!(sheet, "sheet is empty");
            return Ok(Some(Self {
                sheet,
                header: BTreeMap::new(),
                rows: &[],
            }));
        };
        let header = header_row
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Ok(Some(Self {
            sheet,
            header,
            rows: body,
        }))
    }

    fn column(&self, name: &str) -> Result<usize, SourceError> {
        self.optional_column(name)
            .ok_or_else(|| SourceError::MissingColumn {
                sheet: self.sheet.to_string(),
                column: name.to_string(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.header.get(name).copied()
    }

    /// Data rows, skipping ones where every cell is blank.
    fn rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(i, cells)| Row {
                number: i + 2,
                cells,
            })
    }

    fn invalid(&self, row: &Row<'_>, column: &str, value: &str) -> SourceError {
        SourceError::InvalidCell {
            sheet: self.sheet.to_string(),
            row: row.number,
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

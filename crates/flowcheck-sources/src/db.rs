//! SQLite rules store adapter.
//!
//! The store mirrors the canonical model table by table; see [`SCHEMA`].

use crate::builder::PolicySetBuilder;
use crate::error::SourceError;
use crate::values::address_from_parts;
use camino::Utf8Path;
use flowcheck_domain::model::{PolicyRule, PolicySet, PortRange, Protocol, ServiceEntry};
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// DDL for a rules store. Group and policy member tables are ordered by `position`.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS address_objects (
    name      TEXT PRIMARY KEY,
    type      TEXT NOT NULL DEFAULT 'ipmask',
    subnet    TEXT,
    start_ip  TEXT,
    end_ip    TEXT,
    fqdn      TEXT
);
CREATE TABLE IF NOT EXISTS address_group_members (
    group_name TEXT NOT NULL,
    member     TEXT NOT NULL,
    position   INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS service_entries (
    service_name TEXT NOT NULL,
    protocol     TEXT NOT NULL,
    port_low     INTEGER,
    port_high    INTEGER
);
CREATE TABLE IF NOT EXISTS service_group_members (
    group_name TEXT NOT NULL,
    member     TEXT NOT NULL,
    position   INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS policies (
    policy_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL DEFAULT '',
    priority  INTEGER NOT NULL,
    action    TEXT NOT NULL DEFAULT 'deny',
    enabled   INTEGER NOT NULL DEFAULT 1,
    schedule  TEXT,
    comment   TEXT
);
CREATE TABLE IF NOT EXISTS policy_members (
    policy_id TEXT NOT NULL,
    field     TEXT NOT NULL CHECK (field IN ('source', 'destination', 'service')),
    name      TEXT NOT NULL,
    position  INTEGER NOT NULL DEFAULT 0
);
"#;

/// Open the store at `path` read-only and load it.
pub fn load_database(path: &Utf8Path) -> Result<PolicySet, SourceError> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    debug!(path = %path, "opened rules database");
    load_from_connection(&conn)
}

/// Load a policy set from an open connection. Policies are ordered by `priority`, then insertion.
pub fn load_from_connection(conn: &Connection) -> Result<PolicySet, SourceError> {
    let mut builder = PolicySetBuilder::new("database");

    let mut stmt = conn.prepare(
        "SELECT name, type, subnet, start_ip, end_ip, fqdn FROM address_objects ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        ))
    })?;
    for row in rows {
        let (name, kind, subnet, start_ip, end_ip, fqdn) = row?;
        let object = match kind.to_ascii_lowercase().as_str() {
            "iprange" => address_from_parts(&name, &kind, &start_ip, &end_ip),
            "fqdn" => address_from_parts(&name, &kind, &fqdn, ""),
            _ => address_from_parts(&name, &kind, &subnet, ""),
        };
        builder.address(object);
    }

    for (group, members) in group_members(conn, "address_group_members")? {
        builder.address_members(&group, members);
    }

    let mut stmt = conn.prepare(
        "SELECT service_name, protocol, port_low, port_high FROM service_entries ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<i64>>(2)?,
            row.get::<_, Option<i64>>(3)?,
        ))
    })?;
    for row in rows {
        let (service, protocol, low, high) = row?;
        let entry = match service_entry(&protocol, low, high) {
            Some(entry) => vec![entry],
            None => {
                warn!(service = %service, protocol = %protocol, "service entry not understood; skipping");
                Vec::new()
            }
        };
        builder.service_entries(&service, entry);
    }

    for (group, members) in group_members(conn, "service_group_members")? {
        builder.service_members(&group, members);
    }

    let mut members = policy_members(conn)?;
    let mut stmt = conn.prepare(
        "SELECT policy_id, name, priority, action, enabled, schedule, comment
         FROM policies ORDER BY priority, rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;
    for row in rows {
        let (policy_id, name, priority, action, enabled, schedule, comment) = row?;
        let mut fields = members.remove(&policy_id).unwrap_or_default();
        builder.policy(PolicyRule {
            name,
            priority,
            source: fields.remove("source").unwrap_or_default(),
            destination: fields.remove("destination").unwrap_or_default(),
            services: fields.remove("service").unwrap_or_default(),
            action,
            enabled,
            schedule: schedule.filter(|s| !s.is_empty()),
            comment: comment.filter(|c| !c.is_empty()),
            policy_id,
        });
    }
    for orphan in members.keys() {
        warn!(policy_id = %orphan, "policy_members rows reference a missing policy");
    }

    Ok(builder.finish())
}

fn service_entry(protocol: &str, low: Option<i64>, high: Option<i64>) -> Option<ServiceEntry> {
    if protocol.eq_ignore_ascii_case("IP") {
        return Some(ServiceEntry::any());
    }
    let protocol: Protocol = protocol.parse().ok()?;
    let ports = match (low, high) {
        (None, _) => None,
        (Some(low), high) => {
            let low = u16::try_from(low).ok()?;
            let high = u16::try_from(high.unwrap_or(i64::from(low))).ok()?;
            Some(PortRange::new(low, high))
        }
    };
    Some(ServiceEntry {
        protocol: Some(protocol),
        ports,
    })
}

fn group_members(
    conn: &Connection,
    table: &'static str,
) -> Result<BTreeMap<String, Vec<String>>, SourceError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT group_name, member FROM {table} ORDER BY group_name, position, rowid"
    ))?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in rows {
        let (group, member) = row?;
        groups.entry(group).or_default().push(member);
    }
    Ok(groups)
}

/// policy_id -> field -> ordered names.
fn policy_members(
    conn: &Connection,
) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>, SourceError> {
    let mut stmt = conn.prepare(
        "SELECT policy_id, field, name FROM policy_members ORDER BY policy_id, field, position, rowid",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut out: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for row in rows {
        let (policy_id, field, name) = row?;
        out.entry(policy_id)
            .or_default()
            .entry(field)
            .or_default()
            .push(name);
    }
    Ok(out)
}

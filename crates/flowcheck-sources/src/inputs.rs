//! Traffic inputs: network segment CSVs and the port spec list.

use crate::error::SourceError;
use camino::Utf8Path;
use flowcheck_domain::model::Protocol;
use flowcheck_types::ids::INPUT_NETWORK_SEGMENT;
use ipnet::Ipv4Net;
use std::collections::BTreeMap;
use std::io::Read;
use std::net::Ipv4Addr;
use tracing::debug;

/// One row of a network CSV: the parsed segment plus every column as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRecord {
    pub segment: Ipv4Net,
    pub fields: BTreeMap<String, String>,
}

impl NetworkRecord {
    /// Column value, or `""` when the column is absent.
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    pub label: String,
    pub protocol: Protocol,
    pub port: u16,
}

/// Parse a segment as CIDR or bare IPv4 (`/32`). Host bits must be clear.
pub fn parse_ipv4_network(value: &str) -> Result<Ipv4Net, SourceError> {
    let trimmed = value.trim();
    let invalid = |reason: &str| SourceError::InvalidNetwork {
        value: value.to_string(),
        reason: reason.to_string(),
    };
    if trimmed.contains('/') {
        let net: Ipv4Net = trimmed
            .parse()
            .map_err(|_| invalid("not an IPv4 CIDR"))?;
        if net.trunc() != net {
            return Err(invalid("host bits set"));
        }
        Ok(net)
    } else {
        let ip: Ipv4Addr = trimmed
            .parse()
            .map_err(|_| invalid("not an IPv4 address"))?;
        Ok(Ipv4Net::from(ip))
    }
}

pub fn read_network_csv(path: &Utf8Path) -> Result<Vec<NetworkRecord>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::io(path.as_str(), e))?;
    let records = parse_network_csv(file, path.as_str())?;
    debug!(path = %path, records = records.len(), "read network CSV");
    Ok(records)
}

/// Parse network CSV content. `origin` names the input in error messages.
pub fn parse_network_csv<R: Read>(reader: R, origin: &str) -> Result<Vec<NetworkRecord>, SourceError> {
    let csv_err = |source| SourceError::Csv {
        path: origin.to_string(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    if !headers.iter().any(|h| h == INPUT_NETWORK_SEGMENT) {
        return Err(SourceError::MissingHeader {
            path: origin.to_string(),
            header: INPUT_NETWORK_SEGMENT.to_string(),
        });
    }

    let mut out = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        let segment = parse_ipv4_network(
            fields
                .get(INPUT_NETWORK_SEGMENT)
                .map(String::as_str)
                .unwrap_or_default(),
        )?;
        out.push(NetworkRecord { segment, fields });
    }
    Ok(out)
}

pub fn read_port_specs(path: &Utf8Path) -> Result<Vec<PortSpec>, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|e| SourceError::io(path.as_str(), e))?;
    parse_port_specs(&text)
}

/// Parse `label,port/protocol` lines. Blank lines and `#` comments are skipped.
pub fn parse_port_specs(text: &str) -> Result<Vec<PortSpec>, SourceError> {
    let mut specs = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let spec = parse_port_line(line).ok_or_else(|| SourceError::MalformedPortSpec {
            line: index + 1,
            content: line.to_string(),
        })?;
        specs.push(spec);
    }
    Ok(specs)
}

fn parse_port_line(line: &str) -> Option<PortSpec> {
    let (label, rest) = line.split_once(',')?;
    let (port, protocol) = rest.trim().split_once('/')?;
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    Some(PortSpec {
        label: label.to_string(),
        protocol: protocol.trim().parse().ok()?,
        port: port.trim().parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_valid_port_specs() {
        let specs = parse_port_specs("ssh,22/tcp\n\n# resolver\ndns,53/UDP\n").expect("parse");
        assert_eq!(
            specs,
            vec![
                PortSpec {
                    label: "ssh".to_string(),
                    protocol: Protocol::Tcp,
                    port: 22
                },
                PortSpec {
                    label: "dns".to_string(),
                    protocol: Protocol::Udp,
                    port: 53
                },
            ]
        );
    }

    #[test]
    fn malformed_port_line_reports_line_number() {
        let err = parse_port_specs("ssh,22/tcp\nbad-line\n").expect_err("malformed");
        match err {
            SourceError::MalformedPortSpec { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "bad-line");
            }
            other => panic!("unexpected error: {other}"),
        }
        for bad in ["x,99999/tcp", "x,22/icmp", ",22/tcp", "x,22"] {
            assert!(parse_port_specs(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn network_parsing() {
        assert_eq!(
            parse_ipv4_network("10.0.0.0/24").unwrap(),
            "10.0.0.0/24".parse::<Ipv4Net>().unwrap()
        );
        assert_eq!(
            parse_ipv4_network(" 192.168.1.7 ").unwrap(),
            "192.168.1.7/32".parse::<Ipv4Net>().unwrap()
        );
        assert!(matches!(
            parse_ipv4_network("10.0.0.1/24"),
            Err(SourceError::InvalidNetwork { .. })
        ));
        assert!(parse_ipv4_network("fe80::/64").is_err());
        assert!(parse_ipv4_network("").is_err());
    }

    #[test]
    fn network_csv_keeps_metadata_columns() {
        let data = "Network Segment,GN,Site,Location\n10.0.1.0/24,GN1,Tokyo,DC1\n10.0.2.0/24,,,\n";
        let records = parse_network_csv(data.as_bytes(), "dst.csv").expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("Site"), "Tokyo");
        assert_eq!(records[1].field("GN"), "");
        assert_eq!(records[1].field("Nonexistent"), "");
    }

    #[test]
    fn network_csv_requires_segment_header() {
        let err = parse_network_csv("Segment\n10.0.0.0/8\n".as_bytes(), "src.csv")
            .expect_err("missing header");
        assert!(err.to_string().contains("Network Segment"));
    }

    #[test]
    fn reads_files_from_disk() {
        let mut csv_file = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(csv_file, "Network Segment\n172.16.0.0/12").expect("write");
        let path = Utf8Path::from_path(csv_file.path()).expect("utf8");
        let records = read_network_csv(path).expect("read");
        assert_eq!(records[0].segment, "172.16.0.0/12".parse::<Ipv4Net>().unwrap());

        let missing = Utf8Path::new("/nonexistent/flowcheck/ports.txt");
        assert!(matches!(read_port_specs(missing), Err(SourceError::Io { .. })));
    }
}

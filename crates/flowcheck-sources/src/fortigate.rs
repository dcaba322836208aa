//! FortiGate CLI configuration (`show full-configuration` style) adapter.
//!
//! Recognised top-level sections:
//! - `config firewall address`
//! - `config firewall addrgrp`
//! - `config firewall service custom`
//! - `config firewall service group`
//! - `config firewall policy`
//!
//! A `config vdom` / `edit <vdom>` wrapper is transparent. Everything else, including nested
//! `config` blocks inside an entry, is skipped.

use crate::builder::PolicySetBuilder;
use crate::error::SourceError;
use crate::values::{address_from_parts, parse_port_range};
use flowcheck_domain::model::{AddressObject, PolicyRule, PolicySet, Protocol, ServiceEntry};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Address,
    AddressGroup,
    ServiceCustom,
    ServiceGroup,
    Policy,
    Vdom,
    Other,
}

impl Section {
    fn from_path(path: &[String]) -> Self {
        let joined = path.join(" ");
        match joined.as_str() {
            "firewall address" => Section::Address,
            "firewall addrgrp" => Section::AddressGroup,
            "firewall service custom" => Section::ServiceCustom,
            "firewall service group" => Section::ServiceGroup,
            "firewall policy" => Section::Policy,
            "vdom" => Section::Vdom,
            _ => Section::Other,
        }
    }
}

enum Frame {
    Config(Section),
    Edit { transparent: bool },
}

impl Frame {
    fn is_transparent(&self) -> bool {
        matches!(
            self,
            Frame::Config(Section::Vdom) | Frame::Edit { transparent: true }
        )
    }
}

/// One `edit … next` block of a recognised section.
struct Entry {
    section: Section,
    name: String,
    attrs: BTreeMap<String, Vec<String>>,
}

impl Entry {
    fn first(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.attrs.get(key).cloned().unwrap_or_default()
    }
}

/// Parse FortiGate configuration text into a policy set.
pub fn parse_fortigate_config(text: &str) -> Result<PolicySet, SourceError> {
    let mut builder = PolicySetBuilder::new("fortigate");
    let mut stack: Vec<Frame> = Vec::new();
    let mut current: Option<Entry> = None;
    let mut policy_position: i64 = 0;

    // Quoted values (comments in particular) may span lines.
    let mut tokenizer = Tokenizer::default();
    let mut quote_start: Option<usize> = None;

    for (index, raw) in text.lines().enumerate() {
        let Some(tokens) = tokenizer.feed(raw) else {
            quote_start.get_or_insert(index + 1);
            continue;
        };
        quote_start = None;
        let Some((keyword, args)) = tokens.split_first() else {
            continue;
        };
        if keyword.starts_with('#') {
            continue;
        }

        let depth = stack.iter().filter(|f| !f.is_transparent()).count();
        match keyword.as_str() {
            "config" => {
                let section = if depth == 0 {
                    Section::from_path(args)
                } else {
                    Section::Other
                };
                stack.push(Frame::Config(section));
            }
            "edit" => {
                let parent = match stack.last() {
                    Some(Frame::Config(section)) => Some(*section),
                    _ => None,
                };
                let transparent = parent == Some(Section::Vdom);
                if depth == 1
                    && let Some(section) = parent.filter(|s| *s != Section::Other)
                {
                    current = Some(Entry {
                        section,
                        name: args.first().cloned().unwrap_or_default(),
                        attrs: BTreeMap::new(),
                    });
                }
                stack.push(Frame::Edit { transparent });
            }
            "set" => {
                if depth == 2
                    && let (Some(entry), Some((key, values))) = (current.as_mut(), args.split_first())
                {
                    entry.attrs.insert(key.clone(), values.to_vec());
                }
            }
            "next" => {
                if let Some(Frame::Edit { .. }) = stack.last() {
                    stack.pop();
                    if depth == 2
                        && let Some(entry) = current.take()
                    {
                        apply_entry(&mut builder, entry, &mut policy_position);
                    }
                }
            }
            "end" => {
                // Tolerate a missing `next` before `end`.
                if let Some(Frame::Edit { .. }) = stack.last() {
                    stack.pop();
                    if depth == 2
                        && let Some(entry) = current.take()
                    {
                        apply_entry(&mut builder, entry, &mut policy_position);
                    }
                }
                stack.pop();
            }
            _ => {}
        }
    }

    if let Some(line) = quote_start {
        return Err(SourceError::ConfigSyntax {
            line,
            message: "unterminated quoted string".to_string(),
        });
    }
    if let Some(entry) = current.take() {
        apply_entry(&mut builder, entry, &mut policy_position);
    }
    Ok(builder.finish())
}

fn apply_entry(builder: &mut PolicySetBuilder, entry: Entry, policy_position: &mut i64) {
    match entry.section {
        Section::Address => builder.address(address_entry(&entry)),
        Section::AddressGroup => builder.address_members(&entry.name, entry.list("member")),
        Section::ServiceCustom => {
            let entries = service_entries(&entry);
            builder.service_entries(&entry.name, entries);
        }
        Section::ServiceGroup => builder.service_members(&entry.name, entry.list("member")),
        Section::Policy => {
            *policy_position += 1;
            builder.policy(policy_entry(entry, *policy_position));
        }
        Section::Vdom | Section::Other => {}
    }
}

fn address_entry(entry: &Entry) -> AddressObject {
    let kind = entry.first("type").unwrap_or("ipmask");
    match kind {
        "iprange" => address_from_parts(
            &entry.name,
            kind,
            entry.first("start-ip").unwrap_or_default(),
            entry.first("end-ip").unwrap_or_default(),
        ),
        "fqdn" => address_from_parts(
            &entry.name,
            kind,
            entry.first("fqdn").unwrap_or_default(),
            "",
        ),
        _ => {
            let subnet = entry.list("subnet");
            let first = subnet.first().map(String::as_str).unwrap_or_default();
            let second = subnet.get(1).map(String::as_str).unwrap_or_default();
            address_from_parts(&entry.name, kind, first, second)
        }
    }
}

fn service_entries(entry: &Entry) -> Vec<ServiceEntry> {
    let protocol = entry
        .first("protocol")
        .unwrap_or("TCP/UDP/SCTP")
        .to_ascii_uppercase();
    match protocol.as_str() {
        "IP" => vec![ServiceEntry::any()],
        "TCP/UDP/SCTP" | "TCP/UDP/UDP-LITE/SCTP" => {
            let mut entries = Vec::new();
            for (key, proto) in [("tcp-portrange", Protocol::Tcp), ("udp-portrange", Protocol::Udp)] {
                for token in entry.attrs.get(key).into_iter().flatten() {
                    match parse_port_range(token) {
                        Some(range) => entries.push(ServiceEntry::new(proto, range.start, range.end)),
                        None => warn!(service = %entry.name, token = %token, "skipping unparseable port range"),
                    }
                }
            }
            entries
        }
        // ICMP and friends carry no ports.
        _ => Vec::new(),
    }
}

fn policy_entry(entry: Entry, position: i64) -> PolicyRule {
    let enabled = entry.first("status") != Some("disable");
    PolicyRule {
        name: entry.first("name").unwrap_or_default().to_string(),
        priority: position,
        source: entry.list("srcaddr"),
        destination: entry.list("dstaddr"),
        services: entry.list("service"),
        action: entry.first("action").unwrap_or("deny").to_string(),
        enabled,
        schedule: entry.first("schedule").map(str::to_string),
        comment: entry.attrs.get("comments").map(|c| c.join(" ")),
        policy_id: entry.name,
    }
}

/// Splits lines into whitespace-separated tokens, honouring double quotes and backslash
/// escapes inside them. A quoted token left open at the end of a line continues on the next
/// line fed in.
#[derive(Debug, Default)]
struct Tokenizer {
    tokens: Vec<String>,
    /// Open quoted token and whether its last character was a backslash.
    open: Option<(String, bool)>,
}

impl Tokenizer {
    /// Feed one physical line. Returns the logical line's tokens once no quote is left open,
    /// `None` while one is. Each line is scanned once.
    fn feed(&mut self, line: &str) -> Option<Vec<String>> {
        let mut chars = line.chars().peekable();
        if let Some((token, escaped)) = self.open.as_mut() {
            token.push('\n');
            *escaped = false;
        }

        loop {
            if let Some((token, escaped)) = self.open.as_mut() {
                let mut closed = false;
                for c in chars.by_ref() {
                    if *escaped {
                        token.push(c);
                        *escaped = false;
                    } else if c == '\\' {
                        *escaped = true;
                    } else if c == '"' {
                        closed = true;
                        break;
                    } else {
                        token.push(c);
                    }
                }
                if !closed {
                    return None;
                }
                if let Some((token, _)) = self.open.take() {
                    self.tokens.push(token);
                }
                continue;
            }

            let Some(&c) = chars.peek() else {
                break;
            };
            if c.is_whitespace() {
                chars.next();
            } else if c == '"' {
                chars.next();
                self.open = Some((String::new(), false));
            } else {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                self.tokens.push(token);
            }
        }
        Some(std::mem::take(&mut self.tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowcheck_domain::model::{AddressKind, PortRange};

    const SAMPLE: &str = r#"
config system global
    set hostname "fw01"
end
config firewall address
    edit "net"
        set uuid 1b2c
        set subnet 10.0.0.0 255.255.0.0
    next
    edit "all"
    next
    edit "range"
        set type iprange
        set start-ip 10.1.0.10
        set end-ip 10.1.0.20
    next
    edit "web"
        set type fqdn
        set fqdn "www.example.com"
    next
end
config firewall addrgrp
    edit "grp"
        set member "net" "range"
    next
end
config firewall service custom
    edit "web-ports"
        set tcp-portrange 80 443 8000-8080:1024-65535
        set udp-portrange 53
    next
    edit "ALL"
        set protocol IP
    next
    edit "PING"
        set protocol ICMP
        set icmptype 8
    next
end
config firewall service group
    edit "svc"
        set member "web-ports" "tcp_3000-3001"
    next
end
config firewall policy
    edit 7
        set name "web out"
        set srcintf "port1"
        set srcaddr "grp"
        set dstaddr "all"
        set action accept
        set schedule "always"
        set service "svc" "HTTPS"
        set comments "allow web" "traffic"
    next
    edit 3
        set srcaddr "all"
        set dstaddr "all"
        set service "ALL"
        set status disable
    next
end
"#;

    #[test]
    fn parses_objects_groups_and_policies() {
        let set = parse_fortigate_config(SAMPLE).expect("parse");

        let net = &set.address_book.objects["net"];
        assert_eq!(net.kind, AddressKind::IpMask("10.0.0.0/16".parse().unwrap()));
        let all = &set.address_book.objects["all"];
        assert_eq!(all.kind, AddressKind::IpMask("0.0.0.0/0".parse().unwrap()));
        assert!(matches!(set.address_book.objects["range"].kind, AddressKind::IpRange { .. }));
        assert!(matches!(set.address_book.objects["web"].kind, AddressKind::Fqdn(_)));
        assert_eq!(set.address_book.groups["grp"].members, vec!["net", "range"]);

        let web = &set.service_book.services["web-ports"];
        assert_eq!(web.entries.len(), 4);
        assert_eq!(web.entries[2].ports, Some(PortRange::new(8000, 8080)));
        assert_eq!(web.entries[3].protocol, Some(Protocol::Udp));
        assert_eq!(set.service_book.services["ALL"].entries, vec![ServiceEntry::any()]);
        assert!(set.service_book.services["PING"].entries.is_empty());
        // Shorthand member synthesized, catalog entry still present.
        assert!(set.service_book.contains("tcp_3000-3001"));
        assert!(set.service_book.contains("HTTPS"));

        assert_eq!(set.policies.len(), 2);
        let first = &set.policies[0];
        assert_eq!(first.policy_id, "7");
        assert_eq!(first.name, "web out");
        assert_eq!(first.priority, 1);
        assert_eq!(first.action, "accept");
        assert_eq!(first.services, vec!["svc", "HTTPS"]);
        assert_eq!(first.schedule.as_deref(), Some("always"));
        assert_eq!(first.comment.as_deref(), Some("allow web traffic"));
        assert!(first.enabled);

        let second = &set.policies[1];
        assert_eq!(second.policy_id, "3");
        assert_eq!(second.priority, 2);
        assert_eq!(second.action, "deny");
        assert!(!second.enabled);
    }

    #[test]
    fn vdom_wrapper_is_transparent() {
        let text = r#"
config vdom
edit root
config firewall address
    edit "lan"
        set subnet 192.168.1.0/24
    next
end
next
end
"#;
        let set = parse_fortigate_config(text).expect("parse");
        assert_eq!(
            set.address_book.objects["lan"].kind,
            AddressKind::IpMask("192.168.1.0/24".parse().unwrap())
        );
    }

    #[test]
    fn nested_config_blocks_are_skipped() {
        let text = r#"
config firewall policy
    edit 1
        set srcaddr "all"
        config sub-table
            edit 1
                set action "bogus"
            next
        end
        set action accept
    next
end
"#;
        let set = parse_fortigate_config(text).expect("parse");
        assert_eq!(set.policies.len(), 1);
        assert_eq!(set.policies[0].action, "accept");
        assert_eq!(set.policies[0].source, vec!["all"]);
    }

    #[test]
    fn uninterpretable_subnet_is_invalid_not_fatal() {
        let text = "config firewall address\nedit \"odd\"\nset subnet 10.0.0.0 255.0.255.0\nnext\nend\n";
        let set = parse_fortigate_config(text).expect("parse");
        assert!(matches!(set.address_book.objects["odd"].kind, AddressKind::Invalid(_)));
    }

    #[test]
    fn missing_next_before_end_still_applies_entry() {
        let text = "config firewall addrgrp\nedit \"g\"\nset member \"a\"\nend\n";
        let set = parse_fortigate_config(text).expect("parse");
        assert_eq!(set.address_book.groups["g"].members, vec!["a"]);
    }

    #[test]
    fn quoted_values_may_span_lines() {
        let text = "config firewall policy\nedit 1\nset comments \"first line\nsecond line\"\nset action accept\nnext\nend\n";
        let set = parse_fortigate_config(text).expect("parse");
        assert_eq!(set.policies[0].comment.as_deref(), Some("first line\nsecond line"));
        assert_eq!(set.policies[0].action, "accept");
    }

    #[test]
    fn unterminated_quote_reports_line() {
        let text = "config firewall address\nedit \"broken\nnext\nend\n";
        let err = parse_fortigate_config(text).expect_err("syntax error");
        assert!(matches!(err, SourceError::ConfigSyntax { line: 2, .. }));
    }

    #[test]
    fn long_tail_after_stray_quote_fails_at_the_quote() {
        let mut text = String::from("config firewall policy\nedit 1\nset comments \"oops\n");
        for _ in 0..20_000 {
            text.push_str("set action accept\n");
        }
        let err = parse_fortigate_config(&text).expect_err("syntax error");
        assert!(matches!(err, SourceError::ConfigSyntax { line: 3, .. }));
    }

    #[test]
    fn tokenizer_handles_quotes_and_escapes() {
        let mut tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.feed(r#"set comments "say \"hi\"" plain"#).unwrap(),
            vec!["set", "comments", "say \"hi\"", "plain"]
        );
        assert!(tokenizer.feed("   ").unwrap().is_empty());
    }

    #[test]
    fn tokenizer_carries_open_quote_across_lines() {
        let mut tokenizer = Tokenizer::default();
        assert!(tokenizer.feed(r#"set comments "one \"#).is_none());
        assert!(tokenizer.feed("two").is_none());
        assert_eq!(
            tokenizer.feed(r#"three" x"#).unwrap(),
            vec!["set", "comments", "one \ntwo\nthree", "x"]
        );
        assert_eq!(tokenizer.feed("next").unwrap(), vec!["next"]);
    }
}

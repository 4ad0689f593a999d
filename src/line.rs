//! Classification and tokenizing of single registry lines.
//!
//! Every line of `pci.ids` is one of: a vendor line (no indentation), a
//! device line (one tab), a sub-device line (two tabs), or something the
//! lookup ignores. The field layout of each data line is described by the
//! grammar in `pciids.pest`.

use pest::error::{ErrorVariant, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{LineErrorKind, LineKind};

#[derive(Parser)]
#[grammar = "pciids.pest"]
struct PciIdsParser;

/// A classified registry line with its fields extracted.
///
/// IDs are lowercased. Names are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLine {
    Vendor {
        id: String,
        name: String,
    },
    Device {
        id: String,
        name: String,
    },
    SubDevice {
        sub_vendor_id: String,
        sub_device_id: String,
        name: String,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Comment,
    /// A `C xx  name` header opening the device class section.
    Class,
}

/// Classifies `line` by its leading-tab depth and extracts its fields.
///
/// This looks at nothing but the line itself; the parent vendor or device of
/// a line is resolved by the caller.
pub fn classify(line: &str) -> Result<RegistryLine, LineErrorKind> {
    let content = line.trim_start_matches('\t');
    let depth = line.len() - content.len();

    if content.trim().is_empty() {
        return Ok(RegistryLine::Skipped(SkipReason::Blank));
    }
    if content.starts_with('#') {
        return Ok(RegistryLine::Skipped(SkipReason::Comment));
    }

    match depth {
        0 if content.starts_with('C') => Ok(RegistryLine::Skipped(SkipReason::Class)),
        0 => parse_vendor(line),
        1 => parse_device(line),
        2 => parse_sub_device(line),
        n => Err(LineErrorKind::Indentation(n)),
    }
}

fn parse_vendor(line: &str) -> Result<RegistryLine, LineErrorKind> {
    let mut inners = parse_rule(Rule::vendor, LineKind::Vendor, line)?;
    let id = next_str(&mut inners).to_ascii_lowercase();
    let name = collapse_name(next_str(&mut inners));
    Ok(RegistryLine::Vendor { id, name })
}

fn parse_device(line: &str) -> Result<RegistryLine, LineErrorKind> {
    let mut inners = parse_rule(Rule::device, LineKind::Device, line)?;
    let id = next_str(&mut inners).to_ascii_lowercase();
    let name = collapse_name(next_str(&mut inners));
    Ok(RegistryLine::Device { id, name })
}

fn parse_sub_device(line: &str) -> Result<RegistryLine, LineErrorKind> {
    let mut inners = parse_rule(Rule::subsystem, LineKind::SubDevice, line)?;
    let mut id_inners = inners
        .next()
        .map(|subsystem_id| subsystem_id.into_inner())
        .into_iter()
        .flatten();
    let sub_vendor_id = id_inners
        .next()
        .map_or("", |pair| pair.as_str())
        .to_ascii_lowercase();
    let sub_device_id = id_inners
        .next()
        .map_or("", |pair| pair.as_str())
        .to_ascii_lowercase();
    let name = next_str(&mut inners).trim_end().to_string();
    Ok(RegistryLine::SubDevice {
        sub_vendor_id,
        sub_device_id,
        name,
    })
}

/// Runs `rule` over the whole line and returns the fields inside it,
/// separators left out.
fn parse_rule(rule: Rule, kind: LineKind, line: &str) -> Result<Fields<'_>, LineErrorKind> {
    let mut pairs = PciIdsParser::parse(rule, line).map_err(|err| malformed(kind, err))?;
    pairs
        .next()
        .map(|pair| {
            pair.into_inner()
                .filter(|field| field.as_rule() != Rule::separator)
                .collect::<Vec<_>>()
                .into_iter()
        })
        .ok_or_else(|| LineErrorKind::Malformed {
            kind,
            column: 1,
            expected: String::from(layout(kind)),
        })
}

type Fields<'i> = std::vec::IntoIter<Pair<'i, Rule>>;

fn next_str<'i>(fields: &mut Fields<'i>) -> &'i str {
    fields.next().map_or("", |field| field.as_str())
}

/// Double-space runs inside a vendor or device name fold into one space.
fn collapse_name(raw: &str) -> String {
    raw.split("  ").collect::<Vec<_>>().join(" ").trim().to_string()
}

fn malformed(kind: LineKind, err: pest::error::Error<Rule>) -> LineErrorKind {
    let column = match err.line_col {
        LineColLocation::Pos((_, col)) => col,
        LineColLocation::Span((_, col), _) => col,
    };
    let expected = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            let mut labels: Vec<&str> = positives.iter().filter_map(describe).collect();
            labels.dedup();
            if labels.is_empty() {
                String::from(layout(kind))
            } else {
                labels.join(" or ")
            }
        }
        _ => String::from(layout(kind)),
    };
    LineErrorKind::Malformed {
        kind,
        column,
        expected,
    }
}

/// Label for a field rule; `None` for the whole-line rules.
fn describe(rule: &Rule) -> Option<&'static str> {
    match rule {
        Rule::vendor_id | Rule::device_id | Rule::subvendor_id | Rule::subdevice_id => {
            Some("a 4-digit hex ID")
        }
        Rule::vendor_name | Rule::device_name | Rule::subsystem_name => Some("a name"),
        Rule::subsystem_id => Some("`<subvendor> <subdevice>`"),
        Rule::separator => Some("two or more spaces"),
        _ => None,
    }
}

fn layout(kind: LineKind) -> &'static str {
    match kind {
        LineKind::Vendor => "`<vendor>  <name>`",
        LineKind::Device => "`\\t<device>  <name>`",
        LineKind::SubDevice => "`\\t\\t<subvendor> <subdevice>  <name>`",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use pest::{consumes_to, parses_to};

    fn as_upper_hex(n: u16) -> String {
        format!("{:04X}", n)
    }

    fn as_lower_hex(n: u16) -> String {
        format!("{:04x}", n)
    }

    #[test]
    fn test_vendor_rule_tokens() {
        let input = "121a  3Dfx Interactive, Inc.";
        parses_to! {
            parser: PciIdsParser,
            input: input,
            rule: Rule::vendor,
            tokens: [
                vendor(0, input.len(), [
                    vendor_id(0, 4),
                    separator(4, 6),
                    vendor_name(6, input.len())
                ])
            ]
        };
    }

    #[test]
    fn test_device_rule_tokens() {
        let input = "\t0009  Voodoo 4 / Voodoo 5";
        parses_to! {
            parser: PciIdsParser,
            input: input,
            rule: Rule::device,
            tokens: [
                device(0, input.len(), [
                    device_id(1, 5),
                    separator(5, 7),
                    device_name(7, input.len())
                ])
            ]
        };
    }

    #[test]
    fn test_subsystem_rule_tokens() {
        let input = "\t\t121a 0009  Voodoo5 AGP 5500/6000";
        parses_to! {
            parser: PciIdsParser,
            input: input,
            rule: Rule::subsystem,
            tokens: [
                subsystem(0, input.len(), [
                    subsystem_id(2, 11, [
                        subvendor_id(2, 6),
                        subdevice_id(7, 11)
                    ]),
                    separator(11, 13),
                    subsystem_name(13, input.len())
                ])
            ]
        };
    }

    #[test]
    fn test_fake_vendor_line() -> Result<()> {
        let id: u16 = rand::random::<_>();
        let name = format!("Fake vendor ({})", as_upper_hex(id));
        let unparsed = format!("{}  {}", as_upper_hex(id), name);
        println!("Unparsed_data: {:?}", &unparsed);

        match classify(&unparsed).map_err(|e| anyhow!("{}", e))? {
            RegistryLine::Vendor { id: parsed_id, name: parsed_name } => {
                assert_eq!(parsed_id, as_lower_hex(id));
                assert_eq!(parsed_name, name);
            }
            other => panic!("Vendor line parsed as {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_fake_device_line() -> Result<()> {
        let id: u16 = rand::random::<_>();
        let name = format!("Fake device ({})", as_upper_hex(id));
        let unparsed = format!("\t{}  {}", as_upper_hex(id), name);
        println!("Unparsed_data: {:?}", &unparsed);

        match classify(&unparsed).map_err(|e| anyhow!("{}", e))? {
            RegistryLine::Device { id: parsed_id, name: parsed_name } => {
                assert_eq!(parsed_id, as_lower_hex(id));
                assert_eq!(parsed_name, name);
            }
            other => panic!("Device line parsed as {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_fake_sub_device_line() -> Result<()> {
        let subvendor_id: u16 = rand::random::<_>();
        let subdevice_id: u16 = rand::random::<_>();
        let name = format!(
            "Fake subsystem ({}:{})",
            as_upper_hex(subvendor_id),
            as_upper_hex(subdevice_id)
        );
        let unparsed = format!(
            "\t\t{} {}  {}",
            as_upper_hex(subvendor_id),
            as_upper_hex(subdevice_id),
            name
        );
        println!("Unparsed_data: {:?}", &unparsed);

        let expected = RegistryLine::SubDevice {
            sub_vendor_id: as_lower_hex(subvendor_id),
            sub_device_id: as_lower_hex(subdevice_id),
            name,
        };
        assert_eq!(classify(&unparsed).map_err(|e| anyhow!("{}", e))?, expected);
        Ok(())
    }

    #[test]
    fn test_skipped_lines() {
        let cases = vec![
            ("", SkipReason::Blank),
            ("\t  ", SkipReason::Blank),
            ("# comment", SkipReason::Comment),
            ("\t# indented comment", SkipReason::Comment),
            ("C 09  Input device controller", SkipReason::Class),
        ];
        for (input, reason) in cases {
            assert_eq!(
                classify(input),
                Ok(RegistryLine::Skipped(reason)),
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_lowercase_c_is_a_vendor() {
        let parsed = classify("c0a9  Micron/Crucial Technology");
        assert_eq!(
            parsed,
            Ok(RegistryLine::Vendor {
                id: String::from("c0a9"),
                name: String::from("Micron/Crucial Technology"),
            })
        );
    }

    #[test]
    fn test_name_double_spaces_collapse() {
        let parsed = classify("\t0009  Voodoo 4  /  Voodoo 5");
        assert_eq!(
            parsed,
            Ok(RegistryLine::Device {
                id: String::from("0009"),
                name: String::from("Voodoo 4 / Voodoo 5"),
            })
        );
    }

    fn malformed_at(kind: LineKind, column: usize, expected: &str) -> Result<RegistryLine, LineErrorKind> {
        Err(LineErrorKind::Malformed {
            kind,
            column,
            expected: String::from(expected),
        })
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        let spaces = "two or more spaces";
        for (input, kind, column) in vec![
            ("2077 Araska", LineKind::Vendor, 5),
            ("\t0010 Bad", LineKind::Device, 6),
            ("\t0009 Voodoo", LineKind::Device, 6),
            ("\t0009", LineKind::Device, 6),
            ("\t\t121a 0009 Voodoo5", LineKind::SubDevice, 12),
        ] {
            assert_eq!(
                classify(input),
                malformed_at(kind, column, spaces),
                "input: {:?}",
                input
            );
        }
    }

    #[test]
    fn test_short_id_reports_column() {
        assert_eq!(
            classify("\t00  Non-VGA unclassified device"),
            malformed_at(LineKind::Device, 2, "a 4-digit hex ID")
        );
        assert_eq!(
            classify("\t\t121a  Voodoo5"),
            malformed_at(LineKind::SubDevice, 8, "a 4-digit hex ID")
        );
    }

    #[test]
    fn test_missing_name_reports_column() {
        assert_eq!(
            classify("\t0009  "),
            malformed_at(LineKind::Device, 8, "a name")
        );
    }

    #[test]
    fn test_deep_indentation() {
        assert_eq!(
            classify("\t\t\t0000  Too deep"),
            Err(LineErrorKind::Indentation(3))
        );
    }
}

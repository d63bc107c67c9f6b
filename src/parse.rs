//! Decoding of the provider's market documents into [`Table`]s.

use std::io::{Cursor, Read};

use chrono::{DateTime, Duration, Months, NaiveDateTime, Utc};
use roxmltree::{Document, Node};
use zip::ZipArchive;

use crate::codes::psr_type_name;
use crate::error::{Error, Result};
use crate::reports::ReportKind;
use crate::request::{ContentKind, RawResult};
use crate::table::Table;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Turns one raw payload into a UTC table; the assembler localizes it.
pub trait ResponseParser {
    fn parse(&self, kind: ReportKind, raw: &RawResult) -> Result<Table>;
}

/// Reads `TimeSeries/Period/Point` documents, plain or zipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl ResponseParser for DocumentParser {
    fn parse(&self, kind: ReportKind, raw: &RawResult) -> Result<Table> {
        let zipped = match &raw.content {
            ContentKind::Zip => true,
            ContentKind::Xml => false,
            ContentKind::Other(_) => raw.body.starts_with(ZIP_MAGIC),
        };
        if zipped {
            parse_zip(kind, &raw.body)
        } else {
            parse_xml(kind, raw.text()?)
        }
    }
}

fn parse_zip(kind: ReportKind, body: &[u8]) -> Result<Table> {
    let mut archive = ZipArchive::new(Cursor::new(body))?;
    let mut table = Table::new(chrono_tz::UTC);
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        if member.is_dir() {
            continue;
        }
        let mut text = String::new();
        member.read_to_string(&mut text)?;
        table.merge(parse_xml(kind, &text)?);
    }
    Ok(table)
}

pub fn parse_xml(kind: ReportKind, text: &str) -> Result<Table> {
    let doc = Document::parse(text)?;
    let mut table = Table::new(chrono_tz::UTC);
    for series in doc.descendants().filter(|n| is(n, "TimeSeries")) {
        let label = series_label(kind, series);
        let sign = series_sign(kind, series);
        for period in series
            .children()
            .filter(|n| is(n, "Period") || is(n, "Available_Period"))
        {
            read_period(kind, period, &label, sign, &mut table)?;
        }
    }
    Ok(table)
}

fn read_period(kind: ReportKind, period: Node<'_, '_>, label: &str, sign: f64, table: &mut Table) -> Result<()> {
    let start = child(period, "timeInterval")
        .and_then(|ti| child_text(ti, "start"))
        .ok_or_else(|| Error::Parse("period without timeInterval/start".into()))?;
    let start = parse_instant(start)?;
    let resolution = child_text(period, "resolution")
        .ok_or_else(|| Error::Parse("period without resolution".into()))?;
    let step = Resolution::parse(resolution)?;

    for point in period.children().filter(|n| is(n, "Point")) {
        let position: u32 = child_text(point, "position")
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| Error::Parse("point without position".into()))?;
        let Some(value) = child_text(point, kind.value_element()) else {
            continue;
        };
        let value: f64 = value
            .parse()
            .map_err(|_| Error::Parse(format!("bad point value: {value}")))?;
        let at = step.offset(start, position.saturating_sub(1))?;
        table.set(at, label, sign * value);
    }
    Ok(())
}

/// Tag comparison on local names, ignoring case.
fn is(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| is(n, name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

fn descendant_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| is(n, name))
        .and_then(|n| n.text())
        .map(str::trim)
}

fn series_label(kind: ReportKind, series: Node<'_, '_>) -> String {
    use ReportKind::*;
    let psr = child(series, "MktPSRType").and_then(|m| child_text(m, "psrType"));
    let psr_name = psr.map(|code| psr_type_name(code).unwrap_or(code));

    let mut label = match kind {
        GenerationPerPlant | InstalledGenerationCapacityPerUnit => {
            match (descendant_text(series, "name"), psr_name) {
                (Some(plant), Some(psr)) => format!("{plant} [{psr}]"),
                (Some(plant), None) => plant.to_string(),
                (None, _) => psr_name.unwrap_or(kind.label()).to_string(),
            }
        }
        UnavailabilityOfGenerationUnits
        | UnavailabilityOfProductionUnits
        | UnavailabilityTransmission => descendant_text(series, "production_RegisteredResource.name")
            .or_else(|| descendant_text(series, "Asset_RegisteredResource.name"))
            .unwrap_or(kind.label())
            .to_string(),
        _ => psr_name.unwrap_or(kind.label()).to_string(),
    };

    let consumption = matches!(kind, Generation | GenerationPerPlant)
        && child(series, "outBiddingZone_Domain.mRID").is_some();
    if consumption {
        label.push_str(" (consumption)");
    }
    if let Some(direction) = child_text(series, "flowDirection.direction") {
        match direction {
            "A01" => label.push_str(" (Up)"),
            "A02" => label.push_str(" (Down)"),
            "A03" => label.push_str(" (Symmetric)"),
            _ => {}
        }
    }
    label
}

/// Net positions published against a region are exports.
fn series_sign(kind: ReportKind, series: Node<'_, '_>) -> f64 {
    let export = kind == ReportKind::NetPosition
        && child_text(series, "out_Domain.mRID").is_some_and(|d| d.contains("REGION"));
    if export { -1.0 } else { 1.0 }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%MZ")
        .map(|n| n.and_utc())
        .map_err(|_| Error::Parse(format!("bad timestamp: {s}")))
}

/// Point spacing of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Fixed(Duration),
    Months(u32),
}

impl Resolution {
    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "PT15M" => Resolution::Fixed(Duration::minutes(15)),
            "PT30M" => Resolution::Fixed(Duration::minutes(30)),
            "PT60M" | "PT1H" => Resolution::Fixed(Duration::hours(1)),
            "P1D" => Resolution::Fixed(Duration::days(1)),
            "P7D" => Resolution::Fixed(Duration::days(7)),
            "P1M" => Resolution::Months(1),
            "P1Y" => Resolution::Months(12),
            other => return Err(Error::Parse(format!("unsupported resolution: {other}"))),
        })
    }

    fn offset(self, start: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        let shifted = match self {
            Resolution::Fixed(d) => d
                .checked_mul(i32::try_from(steps).unwrap_or(i32::MAX))
                .and_then(|d| start.checked_add_signed(d)),
            Resolution::Months(m) => start.checked_add_months(Months::new(m.saturating_mul(steps))),
        };
        shifted.ok_or_else(|| Error::Parse(format!("point position {steps} out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn doc(root: &str, series: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><{root} xmlns=\"urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0\">{}</{root}>",
            series.concat()
        )
    }

    fn series(extra: &str, start: &str, resolution: &str, points: &[(u32, &str, f64)]) -> String {
        let pts: String = points
            .iter()
            .map(|(pos, el, v)| format!("<Point><position>{pos}</position><{el}>{v}</{el}></Point>"))
            .collect();
        format!(
            "<TimeSeries><mRID>1</mRID>{extra}<Period><timeInterval><start>{start}</start><end>x</end></timeInterval><resolution>{resolution}</resolution>{pts}</Period></TimeSeries>"
        )
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn day_ahead_prices_hourly() {
        let xml = doc(
            "Publication_MarketDocument",
            &[series(
                "",
                "2023-12-31T23:00Z",
                "PT60M",
                &[(1, "price.amount", 80.5), (2, "price.amount", 75.0), (24, "price.amount", 60.0)],
            )],
        );
        let t = DocumentParser
            .parse(ReportKind::DayAheadPrices, &RawResult::xml(xml))
            .unwrap();
        assert_eq!(t.columns(), ["Day-ahead Price"]);
        assert_eq!(t.get(utc(2023, 12, 31, 23, 0), "Day-ahead Price"), Some(80.5));
        assert_eq!(t.get(utc(2024, 1, 1, 0, 0), "Day-ahead Price"), Some(75.0));
        assert_eq!(t.get(utc(2024, 1, 1, 22, 0), "Day-ahead Price"), Some(60.0));
    }

    #[test]
    fn generation_labels_by_psr_and_marks_consumption() {
        let produced = series(
            "<inBiddingZone_Domain.mRID>10YBE----------2</inBiddingZone_Domain.mRID><MktPSRType><psrType>B10</psrType></MktPSRType>",
            "2024-01-01T00:00Z",
            "PT15M",
            &[(1, "quantity", 300.0), (2, "quantity", 310.0)],
        );
        let consumed = series(
            "<outBiddingZone_Domain.mRID>10YBE----------2</outBiddingZone_Domain.mRID><MktPSRType><psrType>B10</psrType></MktPSRType>",
            "2024-01-01T00:00Z",
            "PT15M",
            &[(1, "quantity", 50.0)],
        );
        let xml = doc("GL_MarketDocument", &[produced, consumed]);
        let t = parse_xml(ReportKind::Generation, &xml).unwrap();
        let name = psr_type_name("B10").unwrap();
        let cons = format!("{name} (consumption)");
        assert_eq!(t.columns(), [name.to_string(), cons.clone()]);
        assert_eq!(t.get(utc(2024, 1, 1, 0, 15), name), Some(310.0));
        let nett = t.nett();
        assert_eq!(nett.get(utc(2024, 1, 1, 0, 0), name), Some(250.0));
    }

    #[test]
    fn monthly_resolution_uses_calendar_months() {
        let xml = doc(
            "Balancing_MarketDocument",
            &[series(
                "<flowDirection.direction>A01</flowDirection.direction>",
                "2023-01-31T23:00Z",
                "P1M",
                &[(1, "procurement_Price.amount", 10.0), (2, "procurement_Price.amount", 12.0)],
            )],
        );
        let t = parse_xml(ReportKind::ContractedReservePrices, &xml).unwrap();
        assert_eq!(t.columns(), ["Procurement Price (Up)"]);
        assert_eq!(t.get(utc(2023, 2, 28, 23, 0), "Procurement Price (Up)"), Some(12.0));
    }

    #[test]
    fn region_net_position_is_negated() {
        let xml = doc(
            "Publication_MarketDocument",
            &[series(
                "<out_Domain.mRID>10Y1001A1001A91G-REGION</out_Domain.mRID>",
                "2024-01-01T00:00Z",
                "PT60M",
                &[(1, "quantity", 120.0)],
            )],
        );
        let t = parse_xml(ReportKind::NetPosition, &xml).unwrap();
        assert_eq!(t.get(utc(2024, 1, 1, 0, 0), "Net Position"), Some(-120.0));
    }

    #[test]
    fn zip_members_are_merged() {
        let a = doc(
            "Balancing_MarketDocument",
            &[series("", "2024-01-01T00:00Z", "PT15M", &[(1, "imbalance_Price.amount", 1.0)])],
        );
        let b = doc(
            "Balancing_MarketDocument",
            &[series("", "2024-01-01T00:15Z", "PT15M", &[(1, "imbalance_Price.amount", 2.0)])],
        );
        let mut w = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in [("a.xml", a), ("b.xml", b)] {
            w.start_file(name, zip::write::SimpleFileOptions::default()).unwrap();
            w.write_all(body.as_bytes()).unwrap();
        }
        let bytes = w.finish().unwrap().into_inner();

        let t = DocumentParser
            .parse(ReportKind::ImbalancePrices, &RawResult::zip(bytes.clone()))
            .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(utc(2024, 1, 1, 0, 15), "Imbalance Price"), Some(2.0));

        let sniffed = RawResult::new(ContentKind::Other("application/octet".into()), bytes);
        assert_eq!(DocumentParser.parse(ReportKind::ImbalancePrices, &sniffed).unwrap(), t);
    }

    #[test]
    fn unknown_resolution_is_a_parse_error() {
        let xml = doc(
            "Publication_MarketDocument",
            &[series("", "2024-01-01T00:00Z", "PT5M", &[(1, "quantity", 1.0)])],
        );
        assert!(matches!(parse_xml(ReportKind::Load, &xml), Err(Error::Parse(_))));
        assert!(matches!(parse_xml(ReportKind::Load, "<unclosed>"), Err(Error::Xml(_))));
    }
}

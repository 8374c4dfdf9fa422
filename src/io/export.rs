//! CSV export for cash-flow schedules and cost line items.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::cost::LineItem;
use crate::finance::CashFlowYear;

/// Column header for the cash-flow export.
const CASH_FLOW_HEADER: &str = "year,savings,discount_factor,discounted_savings,cumulative";

/// Column header for the line-item export.
const LINE_ITEM_HEADER: &str = "component,quantity,unit,unit_price,price_source,subtotal";

/// Exports a cash-flow schedule to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_cash_flows(rows: &[CashFlowYear], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_cash_flows(rows, io::BufWriter::new(file))
}

/// Writes a cash-flow schedule as CSV to any writer.
///
/// Year 0 holds the net outlay as a negative `savings` value.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_cash_flows(rows: &[CashFlowYear], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(CASH_FLOW_HEADER.split(','))?;
    for r in rows {
        wtr.write_record(&[
            r.year.to_string(),
            format!("{:.2}", r.savings),
            format!("{:.6}", r.discount_factor),
            format!("{:.2}", r.discounted_savings),
            format!("{:.2}", r.cumulative),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Exports cost line items to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_line_items(items: &[LineItem], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_line_items(items, io::BufWriter::new(file))
}

/// Writes cost line items as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_line_items(items: &[LineItem], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(LINE_ITEM_HEADER.split(','))?;
    for item in items {
        wtr.write_record(&[
            item.component.to_string(),
            format!("{:.2}", item.quantity),
            item.unit.to_string(),
            format!("{:.4}", item.unit_price),
            item.price_source.to_string(),
            format!("{:.2}", item.subtotal),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostComponent, PriceSource};
    use crate::finance::{RateContext, discounted_cash_flows};

    fn schedule() -> Vec<CashFlowYear> {
        discounted_cash_flows(100_000.0, 20_000.0, &RateContext::default())
    }

    #[test]
    fn cash_flow_header_and_row_count() {
        let mut buf = Vec::new();
        write_cash_flows(&schedule(), &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], CASH_FLOW_HEADER);
        // header + year 0 + 25 years
        assert_eq!(lines.len(), 27);
        assert!(lines[1].starts_with("0,-100000.00,1.000000"));
    }

    #[test]
    fn cash_flow_columns_parse() {
        let mut buf = Vec::new();
        write_cash_flows(&schedule(), &mut buf).unwrap();
        let mut rdr = csv::ReaderBuilder::new().from_reader(buf.as_slice());
        let mut rows = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            assert!(rec[0].parse::<u32>().is_ok());
            for i in 1..5 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            rows += 1;
        }
        assert_eq!(rows, 26);
    }

    #[test]
    fn line_items_write_source_tags() {
        let items = vec![LineItem {
            component: CostComponent::Pcs,
            quantity: 250.0,
            unit: "kW",
            unit_price: 180.0,
            price_source: PriceSource::Fallback,
            subtotal: 45_000.0,
        }];
        let mut buf = Vec::new();
        write_line_items(&items, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], LINE_ITEM_HEADER);
        assert_eq!(lines[1], "pcs,250.00,kW,180.0000,fallback,45000.00");
    }

    #[test]
    fn deterministic_output() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_cash_flows(&schedule(), &mut a).unwrap();
        write_cash_flows(&schedule(), &mut b).unwrap();
        assert_eq!(a, b);
    }
}

//! Receipt
//!
//! Tabular rendering of a priced cart or prepared sale.

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, pricing::Totals, sales::Sale};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One printed line.
#[derive(Debug, Clone, PartialEq)]
struct ReceiptLine<'a> {
    code: String,
    name: String,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    discount: Decimal,
    subtotal: Money<'a, Currency>,
}

/// Receipt for a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,
    totals: Totals<'a>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for `cart` priced at `totals`.
    #[must_use]
    pub fn new(cart: &Cart<'a>, totals: Totals<'a>) -> Self {
        let lines = cart
            .iter()
            .map(|line| ReceiptLine {
                code: line.product().code.clone(),
                name: line.product().name.clone(),
                quantity: line.quantity(),
                unit_price: *line.unit_price(),
                discount: line.discount(),
                subtotal: *line.subtotal(),
            })
            .collect();

        Self { lines, totals }
    }

    /// Create a receipt for a prepared sale.
    #[must_use]
    pub fn from_sale(sale: &Sale<'a>) -> Self {
        let lines = sale
            .lines
            .iter()
            .map(|line| ReceiptLine {
                code: line.code.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount: line.discount,
                subtotal: line.subtotal,
            })
            .collect();

        Self {
            lines,
            totals: sale.totals,
        }
    }

    /// Totals printed on the receipt
    pub fn totals(&self) -> &Totals<'a> {
        &self.totals
    }

    /// Number of printed lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the receipt has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Writes the receipt to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "", "Code", "Product", "Qty", "Unit Price", "Discount", "Subtotal",
        ]);

        for (idx, line) in self.lines.iter().enumerate() {
            let discount = if line.discount.is_zero() {
                String::new()
            } else {
                format!("{}%", line.discount.normalize())
            };

            builder.push_record([
                format!("#{}", idx + 1),
                line.code.clone(),
                line.name.clone(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                discount,
                line.subtotal.to_string(),
            ]);
        }

        write_receipt_table(&mut out, builder)?;

        write_receipt_summary(&mut out, &self.totals)
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());
    table.modify(Columns::first(), Color::new("\x1b[90m", "\x1b[0m"));

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(out: &mut impl io::Write, totals: &Totals<'_>) -> Result<(), ReceiptError> {
    let secondary_label = format!(" Total {}:", totals.secondary_total.currency().iso_alpha_code);

    let rows = [
        (" Subtotal:".to_string(), format!("{}  ", totals.subtotal)),
        (" Tax:".to_string(), format!("{}  ", totals.tax)),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", totals.total),
        ),
        (secondary_label, format!("{}  ", totals.secondary_total)),
    ];

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters in dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

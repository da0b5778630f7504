//! Resolution receipts
//!
//! Renders a [`Resolution`] as a terminal table.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::eligibility::{Resolution, ResolvedPromo};

/// Errors writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

const HEADER: [&str; 7] = ["#", "Promo", "Code", "Priority", "Ends", "Available", "Shipping"];

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}

fn push_promo_row(builder: &mut Builder, index: usize, resolved: &ResolvedPromo) {
    builder.push_record([
        format!("#{:<3}", index + 1),
        resolved.promo.name.clone(),
        resolved.promo.promo_code.clone(),
        resolved.promo.priority.to_string(),
        optional(resolved.effective_end_date()),
        optional(resolved.available_count),
        optional(resolved.promo_shipping.map(|fee| fee.normalize())),
    ]);
}

impl Resolution {
    /// Write the resolved promos and the shipping quote.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.promos.is_empty() {
            writeln!(out, "No promotions available")?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(HEADER);

        for (index, resolved) in self.promos.iter().enumerate() {
            push_promo_row(&mut builder, index, resolved);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..), Alignment::right());

        writeln!(out, "\n{table}")?;

        if let Some(promo_shipping) = self.promo_shipping {
            writeln!(out, " Shipping:  {}", promo_shipping.normalize())?;
        }

        if let Some(original_shipping) = self.original_shipping {
            writeln!(out, " Was:       {}", original_shipping.normalize())?;
        }

        writeln!(out)?;

        Ok(())
    }
}

//! CSV rendering of the tabular outputs (curves, surfaces, search candidates).

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::combat::DamageSurface;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One CSV row per record, header taken from the record's field names.
pub fn write_records<W, T>(writer: W, records: &[T]) -> Result<(), ExportError>
where
    W: Write,
    T: Serialize,
{
    let mut out = csv::Writer::from_writer(writer);
    for record in records {
        out.serialize(record)?;
    }
    out.flush()?;
    Ok(())
}

pub fn records_to_string<T: Serialize>(records: &[T]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Long format: one `damage_bonus_pct,crit_damage_pct,damage` row per grid cell.
pub fn write_surface<W: Write>(writer: W, surface: &DamageSurface) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["damage_bonus_pct", "crit_damage_pct", "damage"])?;
    for (crit, row) in surface.crit_damage_pct.iter().zip(&surface.damage) {
        for (bonus, damage) in surface.damage_bonus_pct.iter().zip(row) {
            out.write_record([bonus.to_string(), crit.to_string(), format!("{damage:.6}")])?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn surface_to_string(surface: &DamageSurface) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_surface(&mut buffer, surface)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

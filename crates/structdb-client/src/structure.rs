//! Atomistic view of structure and prototype entries

use crate::entries::{Entry, EntryError, EntryKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How `COORDINATES` are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatesType {
    /// Fractions of the lattice vectors
    Relative,
    /// Cartesian positions in Angstrom
    Absolute,
}

/// Atoms, cell and per-site data of a structure entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Chemical symbol per site
    pub symbols: Vec<String>,
    /// Lattice vectors as rows
    pub cell: [[f64; 3]; 3],
    /// Site coordinates as stored in the entry
    pub coordinates: Vec<[f64; 3]>,
    /// Interpretation of `coordinates`
    pub coordinates_type: CoordinatesType,
    /// Periodicity along each lattice vector
    pub pbc: [bool; 3],
    /// Initial magnetic moments, when the entry has any
    pub magnetic_moments: Option<Vec<f64>>,
    /// Initial charges, when the entry has any
    pub charges: Option<Vec<f64>>,
    /// Strukturbericht designation
    pub strukturbericht: Option<String>,
    /// Id of the generic parent prototype
    pub generic_parent_id: Option<i64>,
}

impl Structure {
    /// Build the atomistic view of a `StructureEntry` or `GenericEntry`
    pub fn from_entry(entry: &Entry) -> Result<Self, EntryError> {
        if !matches!(entry.kind, EntryKind::StructureEntry | EntryKind::GenericEntry) {
            return Err(invalid("__entry_type", format!("{} has no atoms", entry.kind)));
        }

        let symbols = required(entry, "OCCUPATION")?
            .as_array()
            .ok_or_else(|| invalid("OCCUPATION", "expected a list"))?
            .iter()
            .map(|symbol| {
                symbol
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("OCCUPATION", "expected chemical symbols"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cell_rows = vectors(required(entry, "LATTICE_VECTORS")?, "LATTICE_VECTORS")?;
        let cell: [[f64; 3]; 3] = cell_rows
            .try_into()
            .map_err(|_| invalid("LATTICE_VECTORS", "expected three vectors"))?;

        let coordinates = vectors(required(entry, "COORDINATES")?, "COORDINATES")?;
        if coordinates.len() != symbols.len() {
            return Err(invalid(
                "COORDINATES",
                format!("{} sites for {} symbols", coordinates.len(), symbols.len()),
            ));
        }

        let coordinates_type = match entry.str_of("COORDINATES_TYPE") {
            Some("relative") => CoordinatesType::Relative,
            Some("absolute") => CoordinatesType::Absolute,
            other => {
                return Err(invalid(
                    "COORDINATES_TYPE",
                    format!("Unknown COORDINATES_TYPE: {}", other.unwrap_or("<missing>")),
                ))
            }
        };

        let pbc = match coordinates_type {
            CoordinatesType::Relative => [true; 3],
            CoordinatesType::Absolute => cell.map(|row| norm(row) != 0.0),
        };

        let generic_parent_id = entry
            .value_of("GENERICPARENT_ID")
            .and_then(Value::as_i64)
            .or_else(|| entry.generic_parent().and_then(|parent| parent.id));

        Ok(Self {
            symbols,
            cell,
            coordinates,
            coordinates_type,
            pbc,
            magnetic_moments: site_values(entry, "MAGNETIC_MOMENTS")?,
            charges: site_values(entry, "CHARGES")?,
            strukturbericht: entry.str_of("STRUKTURBERICHT").map(str::to_string),
            generic_parent_id,
        })
    }

    /// Number of sites
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True for a structure without sites
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Cartesian site positions
    pub fn positions(&self) -> Vec<[f64; 3]> {
        match self.coordinates_type {
            CoordinatesType::Absolute => self.coordinates.clone(),
            CoordinatesType::Relative => self
                .coordinates
                .iter()
                .map(|frac| {
                    let mut position = [0.0; 3];
                    for (axis, value) in position.iter_mut().enumerate() {
                        *value = (0..3).map(|i| frac[i] * self.cell[i][axis]).sum();
                    }
                    position
                })
                .collect(),
        }
    }

    /// Cell volume (absolute value of the lattice determinant)
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.cell;
        let cross = [
            b[1] * c[2] - b[2] * c[1],
            b[2] * c[0] - b[0] * c[2],
            b[0] * c[1] - b[1] * c[0],
        ];
        (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]).abs()
    }
}

impl Entry {
    /// Atomistic view of this entry, see [`Structure::from_entry`]
    pub fn structure(&self) -> Result<Structure, EntryError> {
        Structure::from_entry(self)
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> EntryError {
    EntryError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn required<'a>(entry: &'a Entry, field: &str) -> Result<&'a Value, EntryError> {
    entry.value_of(field).ok_or_else(|| invalid(field, "missing"))
}

fn vectors(value: &Value, field: &str) -> Result<Vec<[f64; 3]>, EntryError> {
    value
        .as_array()
        .ok_or_else(|| invalid(field, "expected a list of vectors"))?
        .iter()
        .map(|row| {
            let components = row
                .as_array()
                .filter(|components| components.len() == 3)
                .ok_or_else(|| invalid(field, "expected 3-component vectors"))?;
            let mut vector = [0.0; 3];
            for (slot, component) in vector.iter_mut().zip(components) {
                *slot = component
                    .as_f64()
                    .ok_or_else(|| invalid(field, "expected numbers"))?;
            }
            Ok(vector)
        })
        .collect()
}

/// Optional per-site numbers; empty lists read as absent
fn site_values(entry: &Entry, field: &str) -> Result<Option<Vec<f64>>, EntryError> {
    let Some(value) = entry.value_of(field) else {
        return Ok(None);
    };
    let values = value
        .as_array()
        .ok_or_else(|| invalid(field, "expected a list"))?
        .iter()
        .map(|v| v.as_f64().ok_or_else(|| invalid(field, "expected numbers")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((!values.is_empty()).then_some(values))
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

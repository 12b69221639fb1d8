//! Canonical schema and the per-run field negotiation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How a canonical column is typed and filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, filled with a placeholder
    Text,
    /// Non-negative integer, filled with 0
    Count,
    /// Closed yes/no decision, false unless the yes-token is seen
    Flag,
}

/// Canonical columns produced from renamed feed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    NomStation,
    Commune,
    CapaciteTotal,
    BornesLibres,
    VelosDispoTotal,
    VelosMecaniques,
    VelosElectriques,
    LocationPossible,
    RetourPossible,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        CanonicalField::NomStation,
        CanonicalField::Commune,
        CanonicalField::CapaciteTotal,
        CanonicalField::BornesLibres,
        CanonicalField::VelosDispoTotal,
        CanonicalField::VelosMecaniques,
        CanonicalField::VelosElectriques,
        CanonicalField::LocationPossible,
        CanonicalField::RetourPossible,
    ];

    /// Column name in the cleaned dataset
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::NomStation => "NomStation",
            CanonicalField::Commune => "Commune",
            CanonicalField::CapaciteTotal => "CapaciteTotal",
            CanonicalField::BornesLibres => "BornesLibres",
            CanonicalField::VelosDispoTotal => "VelosDispoTotal",
            CanonicalField::VelosMecaniques => "VelosMecaniques",
            CanonicalField::VelosElectriques => "VelosElectriques",
            CanonicalField::LocationPossible => "LocationPossible",
            CanonicalField::RetourPossible => "RetourPossible",
        }
    }

    /// Field name in the raw feed
    pub fn source_key(self) -> &'static str {
        match self {
            CanonicalField::NomStation => "name",
            CanonicalField::Commune => "nom_arrondissement_communes",
            CanonicalField::CapaciteTotal => "capacity",
            CanonicalField::BornesLibres => "numdocksavailable",
            CanonicalField::VelosDispoTotal => "numbikesavailable",
            CanonicalField::VelosMecaniques => "mechanical",
            CanonicalField::VelosElectriques => "ebike",
            CanonicalField::LocationPossible => "is_renting",
            CanonicalField::RetourPossible => "is_returning",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            CanonicalField::NomStation | CanonicalField::Commune => FieldKind::Text,
            CanonicalField::LocationPossible | CanonicalField::RetourPossible => FieldKind::Flag,
            _ => FieldKind::Count,
        }
    }

    pub fn from_source_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.source_key() == key)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn of_kind(kind: FieldKind) -> impl Iterator<Item = CanonicalField> {
        Self::ALL.into_iter().filter(move |f| f.kind() == kind)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which canonical columns exist in this run.
///
/// Built once by schema normalization and narrowed by the missing-data
/// policy; later stages consult it instead of probing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableFields {
    fields: BTreeSet<CanonicalField>,
}

impl AvailableFields {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        CanonicalField::ALL.into_iter().collect()
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains(&field)
    }

    pub fn insert(&mut self, field: CanonicalField) -> bool {
        self.fields.insert(field)
    }

    pub fn remove(&mut self, field: CanonicalField) -> bool {
        self.fields.remove(&field)
    }

    /// Available columns in canonical order
    pub fn iter(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.fields.iter().copied()
    }

    pub fn of_kind(&self, kind: FieldKind) -> Vec<CanonicalField> {
        self.iter().filter(|f| f.kind() == kind).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<CanonicalField> for AvailableFields {
    fn from_iter<I: IntoIterator<Item = CanonicalField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

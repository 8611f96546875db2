pub mod pager;

use std::cmp::Ordering;

use crate::model::AnalysisRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Sequence,
    Parameter,
    UnitOfMeasure,
    ReferenceValue,
    ObservedValue,
    Gap,
}

impl SortField {
    pub fn label(self) -> &'static str {
        match self {
            SortField::Sequence => "no",
            SortField::Parameter => "parameter",
            SortField::UnitOfMeasure => "uom",
            SortField::ReferenceValue => "reference",
            SortField::ObservedValue => "existing",
            SortField::Gap => "gap",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    // Re-selecting the active column flips the direction; any other column
    // starts over ascending.
    pub fn toggled(self, requested: SortField) -> Self {
        if requested == self.field {
            Self {
                field: self.field,
                direction: self.direction.flipped(),
            }
        } else {
            Self::ascending(requested)
        }
    }
}

pub fn compare(a: &AnalysisRecord, b: &AnalysisRecord, spec: SortSpec) -> Ordering {
    let ordering = match spec.field {
        SortField::Sequence => a.sequence.cmp(&b.sequence),
        SortField::Parameter => a.parameter.cmp(&b.parameter),
        SortField::UnitOfMeasure => a.unit_of_measure.cmp(&b.unit_of_measure),
        SortField::ReferenceValue => a.reference_value.total_cmp(&b.reference_value),
        SortField::ObservedValue => a.observed_value.total_cmp(&b.observed_value),
        SortField::Gap => a.gap.total_cmp(&b.gap),
    };
    match spec.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

// Stable by construction (slice::sort_by is a stable sort), so rows with
// equal keys keep their insertion order and the sequence column does not
// jitter between re-sorts.
pub fn sort_records(records: &mut [AnalysisRecord], spec: SortSpec) {
    records.sort_by(|a, b| compare(a, b, spec));
}

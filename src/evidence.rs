//! Evidence signature types
//!
//! An evidence signature is a single typed and positioned hint of a structural variant, as
//! reported by the upstream signature detection step. Signatures are immutable once ingested.
//!

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use crate::genome_segment::GenomeSegment;

/// The six structural variant classes handled by clustering and combination
///
/// The derived order is the type order used for all deterministic tie-breaking.
///
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    EnumCount,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub enum SvType {
    Deletion,
    Insertion,
    Inversion,
    TandemDuplication,
    Translocation,
    InsertionWithOrigin,
}

impl SvType {
    /// Label used in input parsing and all output files
    pub fn label(&self) -> &'static str {
        match self {
            SvType::Deletion => "DEL",
            SvType::Insertion => "INS",
            SvType::Inversion => "INV",
            SvType::TandemDuplication => "DUP",
            SvType::Translocation => "BND",
            SvType::InsertionWithOrigin => "DUP_INT",
        }
    }

    /// Parse a type label, accepting both the output labels and the short lowercase labels used
    /// by older signature files
    pub fn from_label(label: &str) -> Option<Self> {
        let sv_type = match label {
            "DEL" | "del" => SvType::Deletion,
            "INS" | "ins" => SvType::Insertion,
            "INV" | "inv" => SvType::Inversion,
            "DUP" | "dup" => SvType::TandemDuplication,
            "BND" | "tra" => SvType::Translocation,
            "DUP_INT" | "ins_dup" => SvType::InsertionWithOrigin,
            _ => return None,
        };
        Some(sv_type)
    }

    /// True for types carrying both a source and a destination locus
    pub fn is_two_sided(&self) -> bool {
        match self {
            SvType::Deletion
            | SvType::Insertion
            | SvType::Inversion
            | SvType::TandemDuplication => false,
            SvType::Translocation | SvType::InsertionWithOrigin => true,
        }
    }
}

impl fmt::Display for SvType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Source and destination loci of a two-sided signature
///
/// For a translocation both loci are breakends. For an insertion with detected origin, the
/// source is the origin region and the destination is the insertion site.
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BreakendPair {
    pub source: GenomeSegment,
    pub destination: GenomeSegment,
}

/// Class-specific signature payload
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum SvEvidence {
    Deletion(GenomeSegment),
    Insertion(GenomeSegment),
    Inversion(GenomeSegment),
    TandemDuplication(GenomeSegment),
    Translocation(BreakendPair),
    InsertionWithOrigin(BreakendPair),
}

impl SvEvidence {
    /// Build the payload for a type from its primary and optional secondary locus
    ///
    /// Returns None if the secondary locus presence does not match the type
    ///
    pub fn from_loci(
        sv_type: SvType,
        primary: GenomeSegment,
        secondary: Option<GenomeSegment>,
    ) -> Option<Self> {
        let x = match (sv_type, secondary) {
            (SvType::Deletion, None) => SvEvidence::Deletion(primary),
            (SvType::Insertion, None) => SvEvidence::Insertion(primary),
            (SvType::Inversion, None) => SvEvidence::Inversion(primary),
            (SvType::TandemDuplication, None) => SvEvidence::TandemDuplication(primary),
            (SvType::Translocation, Some(destination)) => SvEvidence::Translocation(BreakendPair {
                source: primary,
                destination,
            }),
            (SvType::InsertionWithOrigin, Some(destination)) => {
                SvEvidence::InsertionWithOrigin(BreakendPair {
                    source: primary,
                    destination,
                })
            }
            _ => return None,
        };
        Some(x)
    }

    pub fn sv_type(&self) -> SvType {
        match self {
            SvEvidence::Deletion(_) => SvType::Deletion,
            SvEvidence::Insertion(_) => SvType::Insertion,
            SvEvidence::Inversion(_) => SvType::Inversion,
            SvEvidence::TandemDuplication(_) => SvType::TandemDuplication,
            SvEvidence::Translocation(_) => SvType::Translocation,
            SvEvidence::InsertionWithOrigin(_) => SvType::InsertionWithOrigin,
        }
    }

    /// The primary interval, which is the source locus for two-sided types
    pub fn primary(&self) -> &GenomeSegment {
        match self {
            SvEvidence::Deletion(x)
            | SvEvidence::Insertion(x)
            | SvEvidence::Inversion(x)
            | SvEvidence::TandemDuplication(x) => x,
            SvEvidence::Translocation(x) | SvEvidence::InsertionWithOrigin(x) => &x.source,
        }
    }

    pub fn breakend_pair(&self) -> Option<&BreakendPair> {
        match self {
            SvEvidence::Deletion(_)
            | SvEvidence::Insertion(_)
            | SvEvidence::Inversion(_)
            | SvEvidence::TandemDuplication(_) => None,
            SvEvidence::Translocation(x) | SvEvidence::InsertionWithOrigin(x) => Some(x),
        }
    }

    /// Implied SV size used for size filtering, or None for translocation breakpoints which have
    /// no meaningful size
    pub fn sv_size(&self) -> Option<i64> {
        match self {
            SvEvidence::Translocation(_) => None,
            _ => Some(self.primary().range.size()),
        }
    }
}

/// A single ingested evidence signature with its provenance
///
/// Field order defines the canonical sort order of the evidence store.
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EvidenceSignature {
    pub evidence: SvEvidence,
    pub mapq: u32,
    pub read_name: String,
}

impl EvidenceSignature {
    pub fn sv_type(&self) -> SvType {
        self.evidence.sv_type()
    }
}

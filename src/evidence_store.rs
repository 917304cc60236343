//! Ingestion of evidence signatures into the in-memory evidence store
//!
//! Malformed records are dropped here with a warning, so every later stage can assume that all
//! evidence satisfies the type invariants.
//!

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

use camino::Utf8Path;
use flate2::read::MultiGzDecoder;
use log::{info, warn};
use strum::IntoEnumIterator;
use thousands::Separable;
use unwrap::unwrap;

use crate::chrom_list::ChromList;
use crate::config::IngestConfig;
use crate::evidence::{EvidenceSignature, SvEvidence, SvType};
use crate::genome_segment::GenomeSegment;
use crate::run_stats::IngestStats;

/// Only this many malformed records are individually reported in the log
const MAX_REPORTED_PARSE_ERRORS: usize = 20;

#[derive(Debug, PartialEq)]
pub enum EvidenceParseError {
    ColumnCount(usize),
    InvalidInteger { field: &'static str, value: String },
    UnknownType(String),
    NegativeCoordinate { field: &'static str, value: i64 },
    InvertedInterval { start: i64, end: i64 },
    MissingDestination(SvType),
    UnexpectedDestination(SvType),
}

impl fmt::Display for EvidenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use EvidenceParseError::*;
        match self {
            ColumnCount(x) => write!(f, "expected 6 or 9 columns, found {x}"),
            InvalidInteger { field, value } => {
                write!(f, "can't parse {field} value '{value}' as an integer")
            }
            UnknownType(x) => write!(f, "unknown evidence type '{x}'"),
            NegativeCoordinate { field, value } => {
                write!(f, "{field} coordinate {value} is negative")
            }
            InvertedInterval { start, end } => {
                write!(f, "interval start {start} is greater than end {end}")
            }
            MissingDestination(x) => write!(f, "{x} evidence requires a destination locus"),
            UnexpectedDestination(x) => {
                write!(f, "{x} evidence can't have a destination locus")
            }
        }
    }
}

impl std::error::Error for EvidenceParseError {}

/// A parsed evidence line, before chromosome indexing and filtering
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvidenceRecord {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub sv_type: SvType,
    pub mapq: u32,
    pub read_name: String,
    pub destination: Option<(String, i64, i64)>,
}

fn parse_int<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> Result<T, EvidenceParseError> {
    value
        .parse::<T>()
        .map_err(|_| EvidenceParseError::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn parse_interval(start: &str, end: &str) -> Result<(i64, i64), EvidenceParseError> {
    let start = parse_int::<i64>("start", start)?;
    let end = parse_int::<i64>("end", end)?;
    if start < 0 {
        return Err(EvidenceParseError::NegativeCoordinate {
            field: "start",
            value: start,
        });
    }
    if start > end {
        return Err(EvidenceParseError::InvertedInterval { start, end });
    }
    Ok((start, end))
}

/// Parse one tab-delimited evidence line
///
/// Expected columns are:
///
///     chrom start end type mapq read_name [dest_chrom dest_start dest_end]
///
pub fn parse_evidence_line(line: &str) -> Result<RawEvidenceRecord, EvidenceParseError> {
    let words = line.trim_end().split('\t').collect::<Vec<_>>();
    if words.len() != 6 && words.len() != 9 {
        return Err(EvidenceParseError::ColumnCount(words.len()));
    }

    let (start, end) = parse_interval(words[1], words[2])?;
    let sv_type = SvType::from_label(words[3])
        .ok_or_else(|| EvidenceParseError::UnknownType(words[3].to_string()))?;
    let mapq = parse_int::<u32>("mapq", words[4])?;

    let destination = if words.len() == 9 {
        let (dest_start, dest_end) = parse_interval(words[7], words[8])?;
        Some((words[6].to_string(), dest_start, dest_end))
    } else {
        None
    };

    match (sv_type.is_two_sided(), destination.is_some()) {
        (true, false) => return Err(EvidenceParseError::MissingDestination(sv_type)),
        (false, true) => return Err(EvidenceParseError::UnexpectedDestination(sv_type)),
        _ => {}
    }

    Ok(RawEvidenceRecord {
        chrom: words[0].to_string(),
        start,
        end,
        sv_type,
        mapq,
        read_name: words[5].to_string(),
        destination,
    })
}

/// The complete set of accepted evidence signatures for one run
///
/// Evidence is held in canonical sorted order, so that evidence indexes and everything derived
/// from them are independent of the input record order.
///
pub struct EvidenceStore {
    pub chrom_list: ChromList,
    pub evidence: Vec<EvidenceSignature>,
    pub ingest_stats: IngestStats,
}

impl EvidenceStore {
    /// Build the store from parsed records, applying the mapping quality and size filters
    ///
    /// `malformed_record_count` is carried through to the ingestion statistics.
    ///
    pub fn from_records(
        config: &IngestConfig,
        records: Vec<RawEvidenceRecord>,
        malformed_record_count: usize,
    ) -> Self {
        let mut ingest_stats = IngestStats {
            malformed_record_count,
            ..Default::default()
        };

        let chrom_list = ChromList::from_labels(records.iter().flat_map(|x| {
            std::iter::once(x.chrom.as_str())
                .chain(x.destination.as_ref().map(|(chrom, _, _)| chrom.as_str()))
        }));
        let get_segment = |chrom: &str, start: i64, end: i64| {
            GenomeSegment::new(chrom_list.label_to_index[chrom], start, end)
        };

        let mut evidence = Vec::new();
        for record in records {
            let primary = get_segment(&record.chrom, record.start, record.end);
            let secondary = record
                .destination
                .as_ref()
                .map(|(chrom, start, end)| get_segment(chrom, *start, *end));

            // Type and destination consistency is checked during parsing:
            let sv_evidence = SvEvidence::from_loci(record.sv_type, primary, secondary).unwrap();

            if record.mapq < config.min_mapq {
                *ingest_stats
                    .low_mapq_filtered
                    .entry(record.sv_type)
                    .or_default() += 1;
                continue;
            }

            if let Some(size) = sv_evidence.sv_size()
                && (size < config.min_sv_size || size > config.max_sv_size)
            {
                *ingest_stats.size_filtered.entry(record.sv_type).or_default() += 1;
                continue;
            }

            *ingest_stats.accepted.entry(record.sv_type).or_default() += 1;
            evidence.push(EvidenceSignature {
                evidence: sv_evidence,
                mapq: record.mapq,
                read_name: record.read_name,
            });
        }

        evidence.sort();

        Self {
            chrom_list,
            evidence,
            ingest_stats,
        }
    }

    /// Read evidence signatures from a plain or gzip-compressed tab-delimited file
    ///
    pub fn from_file(config: &IngestConfig, filename: &Utf8Path) -> Self {
        info!("Reading evidence signatures from file: '{filename}'");

        let file = unwrap!(
            File::open(filename),
            "Unable to open evidence signature file: '{filename}'"
        );
        let reader: Box<dyn Read> = if filename.extension() == Some("gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        let reader = BufReader::new(reader);

        let mut records = Vec::new();
        let mut malformed_record_count = 0;
        for (line_index, line) in reader.lines().enumerate() {
            let line = unwrap!(
                line,
                "Unable to read line {} from evidence signature file: '{filename}'",
                line_index + 1
            );
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_evidence_line(&line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    malformed_record_count += 1;
                    if malformed_record_count <= MAX_REPORTED_PARSE_ERRORS {
                        warn!(
                            "Dropping malformed evidence record at line {}: {err}",
                            line_index + 1
                        );
                    }
                }
            }
        }

        if malformed_record_count > MAX_REPORTED_PARSE_ERRORS {
            warn!(
                "Dropped {} malformed evidence records in total",
                malformed_record_count.separate_with_commas()
            );
        }

        let store = Self::from_records(config, records, malformed_record_count);
        store.log_ingest_summary();
        store
    }

    fn log_ingest_summary(&self) {
        let stats = &self.ingest_stats;
        for sv_type in SvType::iter() {
            let get = |x: &std::collections::BTreeMap<SvType, usize>| {
                x.get(&sv_type).copied().unwrap_or(0).separate_with_commas()
            };
            info!(
                "Found {} {sv_type} signatures ({} filtered for mapping quality, {} filtered for size)",
                get(&stats.accepted),
                get(&stats.low_mapq_filtered),
                get(&stats.size_filtered),
            );
        }
    }
}

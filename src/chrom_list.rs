//! Chromosome naming and indexing
//!

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Split a label into alternating runs of digits and non-digits
fn label_chunks(label: &str) -> impl Iterator<Item = &str> {
    let mut rest = label;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_digit = first.is_ascii_digit();
        let split = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(split);
        rest = tail;
        Some(chunk)
    })
}

fn compare_label_chunks(a: &str, b: &str) -> Ordering {
    let a_is_digit = a.starts_with(|c: char| c.is_ascii_digit());
    let b_is_digit = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_is_digit, b_is_digit) {
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Natural order of chromosome labels, so that 'chr2' sorts before 'chr10'
///
/// Digit runs compare by numeric value and all other runs compare lexically. Labels that only
/// differ by leading zeros fall back to plain lexical order.
///
pub fn natural_label_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chunks = label_chunks(a);
    let mut b_chunks = label_chunks(b);
    loop {
        match (a_chunks.next(), b_chunks.next()) {
            (Some(x), Some(y)) => match compare_label_chunks(x, y) {
                Ordering::Equal => {}
                ord => return ord,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChromInfo {
    pub label: String,
}

/// Map between chromosome labels and the chromosome indexes used in all internal genome
/// coordinates
///
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ChromList {
    pub data: Vec<ChromInfo>,

    #[serde(skip)]
    pub label_to_index: HashMap<String, usize>,
}

impl ChromList {
    pub fn add_chrom(&mut self, label: &str) {
        assert!(
            !self.label_to_index.contains_key(label),
            "Duplicate chromosome label '{label}'"
        );
        self.label_to_index
            .insert(label.to_string(), self.data.len());
        self.data.push(ChromInfo {
            label: label.to_string(),
        });
    }

    /// Build a chromosome list from an unordered set of labels
    ///
    /// Indexes are assigned in natural label order, so the result does not depend on the order
    /// in which labels were first observed.
    ///
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut labels = labels.into_iter().collect::<Vec<_>>();
        labels.sort_by(|a, b| natural_label_cmp(a, b));
        labels.dedup();
        let mut chrom_list = Self::default();
        for label in labels {
            chrom_list.add_chrom(label);
        }
        chrom_list
    }

    pub fn label(&self, chrom_index: usize) -> &str {
        self.data[chrom_index].label.as_str()
    }
}

//! Writers for the combined call outputs
//!

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use rust_htslib::bcf;
use unwrap::unwrap;

use crate::chrom_list::ChromList;
use crate::combine_clusters::{CallCompleteness, CallSet, CombinedCall};
use crate::evidence::SvType;
use crate::genome_segment::GenomeSegment;
use crate::vcf_utils;

pub const CALLS_BED_FILENAME: &str = "calls.bed";
pub const CALLS_VCF_FILENAME: &str = "calls.vcf";

const INCOMPLETE_FILTER: &str = "incomplete";

fn write_calls_bed_records(
    f: &mut impl Write,
    chrom_list: &ChromList,
    call_set: &CallSet,
) -> std::io::Result<()> {
    let mut write_segment = |segment: &GenomeSegment, call: &CombinedCall| {
        writeln!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            chrom_list.label(segment.chrom_index),
            segment.range.start,
            segment.range.end,
            call.id,
            call.total_support
        )
    };
    for call in call_set.calls.iter() {
        write_segment(&call.locus, call)?;
        if let Some(partner_locus) = &call.partner_locus {
            write_segment(partner_locus, call)?;
        }
    }
    Ok(())
}

/// Write one bed line per call locus, complete two-sided calls get a second line for their
/// destination locus
///
pub fn write_calls_bed(output_dir: &Utf8Path, chrom_list: &ChromList, call_set: &CallSet) {
    let filename = output_dir.join(CALLS_BED_FILENAME);
    info!("Writing SV calls to bed file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create SV call bed file: '{filename}'"
    );
    let mut f = BufWriter::new(f);
    unwrap!(
        write_calls_bed_records(&mut f, chrom_list, call_set),
        "Unable to write SV call bed file: '{filename}'"
    );
}

fn get_calls_vcf_header(chrom_list: &ChromList) -> bcf::Header {
    let mut header = vcf_utils::get_basic_vcf_header(chrom_list);

    let incomplete_filter = format!(
        "##FILTER=<ID={INCOMPLETE_FILTER},Description=\"Only the source side of a two-sided SV was resolved\">"
    );
    header.push_record(incomplete_filter.as_bytes());

    vcf_utils::push_shared_info_records(&mut header);

    let records: Vec<&[u8]> = vec![
        br#"##INFO=<ID=CLUSTERS,Number=.,Type=Integer,Description="Names of the evidence clusters combined into the call">"#,
        br#"##INFO=<ID=CHR2,Number=1,Type=String,Description="Chromosome of the destination locus">"#,
        br#"##INFO=<ID=POS2,Number=1,Type=Integer,Description="Start position of the destination locus">"#,
        br#"##INFO=<ID=END2,Number=1,Type=Integer,Description="End position of the destination locus">"#,
    ];
    for x in records.into_iter() {
        header.push_record(x);
    }

    header
}

/// Set SVLEN, negative for deletions and absent for breakends
fn add_svlen(call: &CombinedCall, record: &mut bcf::Record) {
    let size = call.locus.range.size();
    let sv_len = match call.final_type {
        SvType::Deletion => -size,
        SvType::Translocation => return,
        SvType::Insertion
        | SvType::Inversion
        | SvType::TandemDuplication
        | SvType::InsertionWithOrigin => size,
    };
    record.push_info_integer(b"SVLEN", &[sv_len as i32]).unwrap();
}

fn add_clusters(call: &CombinedCall, record: &mut bcf::Record) {
    let cluster_indexes = call
        .contributing_clusters
        .iter()
        .map(|x| x.0 as i32)
        .collect::<Vec<_>>();
    record
        .push_info_integer(b"CLUSTERS", cluster_indexes.as_slice())
        .unwrap();
}

fn add_partner_locus(chrom_list: &ChromList, call: &CombinedCall, record: &mut bcf::Record) {
    if let Some(partner_locus) = &call.partner_locus {
        let (pos2, end2) = vcf_utils::get_vcf_pos_end(partner_locus);
        let chrom2 = chrom_list.label(partner_locus.chrom_index);
        record
            .push_info_string(b"CHR2", &[chrom2.as_bytes()])
            .unwrap();
        record.push_info_integer(b"POS2", &[pos2 as i32]).unwrap();
        record.push_info_integer(b"END2", &[end2 as i32]).unwrap();
    }
}

fn add_call_filters(call: &CombinedCall, record: &mut bcf::Record) {
    let filter = match call.completeness {
        CallCompleteness::Complete => "PASS",
        CallCompleteness::Incomplete => INCOMPLETE_FILTER,
    };
    record.push_filter(filter.as_bytes()).unwrap();
}

fn convert_call_to_vcf_record(
    chrom_list: &ChromList,
    vcf: &bcf::Writer,
    call: &CombinedCall,
) -> bcf::Record {
    let mut record =
        vcf_utils::get_symbolic_sv_record(vcf, &call.locus, &call.id, call.final_type);
    add_svlen(call, &mut record);
    vcf_utils::add_support(call.total_support, &mut record);
    add_clusters(call, &mut record);
    add_partner_locus(chrom_list, call, &mut record);
    add_call_filters(call, &mut record);
    record
}

/// Write all calls to a plain text VCF file without sample columns
///
pub fn write_calls_vcf(output_dir: &Utf8Path, chrom_list: &ChromList, call_set: &CallSet) {
    let filename = output_dir.join(CALLS_VCF_FILENAME);
    info!("Writing SV calls to vcf file: '{filename}'");

    let header = get_calls_vcf_header(chrom_list);
    let mut vcf = unwrap!(
        bcf::Writer::from_path(&filename, &header, true, bcf::Format::Vcf),
        "Unable to create SV call vcf file: '{filename}'"
    );

    for call in call_set.calls.iter() {
        let record = convert_call_to_vcf_record(chrom_list, &vcf, call);
        unwrap!(
            vcf.write(&record),
            "Unable to write SV call vcf file: '{filename}'"
        );
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;
    use crate::cluster_evidence::cluster_all_evidence;
    use crate::combine_clusters::combine_clusters;
    use crate::config::test_utils::get_test_config;
    use crate::evidence_store::EvidenceStore;
    use crate::evidence_store::test_utils::{get_test_store, one_sided, two_sided};
    use crate::vcf_utils::test_utils::{read_vcf_header, read_vcf_records};

    fn get_test_call_set() -> (EvidenceStore, CallSet) {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                one_sided("chr1", 1000, 1100, "DEL", "r1"),
                two_sided("chr1", 5000, 5000, "BND", "chr2", 300, 300, "r2"),
                two_sided("chr1", 9000, 9000, "BND", "chr2", 8000, 8000, "r3"),
            ],
        );
        let (arena, _) = cluster_all_evidence(1, &config.cluster, &store);
        let (call_set, _) = combine_clusters(&config.combine, &store, arena).unwrap();
        (store, call_set)
    }

    #[test]
    fn test_calls_bed_records() {
        let (store, call_set) = get_test_call_set();
        let mut buf = Vec::new();
        write_calls_bed_records(&mut buf, &store.chrom_list, &call_set).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "chr1\t1000\t1100\tsvcluster.DEL.1\t1",
                "chr1\t5000\t5000\tsvcluster.BND.1\t2",
                "chr2\t300\t300\tsvcluster.BND.1\t2",
                "chr1\t9000\t9000\tsvcluster.BND.2\t2",
                "chr2\t8000\t8000\tsvcluster.BND.2\t2",
            ]
        );
    }

    fn write_test_calls_vcf(store: &EvidenceStore, call_set: &CallSet) -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = Utf8Path::from_path(dir.path()).unwrap();
        write_calls_vcf(output_dir, &store.chrom_list, call_set);
        let filename = output_dir.join(CALLS_VCF_FILENAME);
        (dir, filename)
    }

    #[test]
    fn test_vcf_records() {
        let (store, call_set) = get_test_call_set();
        let (_dir, filename) = write_test_calls_vcf(&store, &call_set);
        let records = read_vcf_records(&filename);
        assert_eq!(records.len(), 3);

        assert_eq!(
            records[0],
            "chr1\t1001\tsvcluster.DEL.1\tN\t<DEL>\t.\tPASS\tSVTYPE=DEL;END=1100;SVLEN=-100;SUPPORT=1;CLUSTERS=0"
        );

        let bnd = &records[1];
        assert!(bnd.starts_with("chr1\t5001\tsvcluster.BND.1\tN\t<BND>\t.\tPASS\t"));
        assert!(bnd.contains(";CHR2=chr2;POS2=301;END2=301"));
        assert!(!bnd.contains("SVLEN"));
    }

    #[test]
    fn test_incomplete_call_is_filtered() {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                two_sided("chr1", 5000, 5000, "BND", "chr5", 20000, 20000, "r1"),
                two_sided("chr1", 9000, 9000, "BND", "chr5", 20100, 20100, "r2"),
            ],
        );
        let (arena, _) = cluster_all_evidence(1, &config.cluster, &store);
        let (call_set, _) = combine_clusters(&config.combine, &store, arena).unwrap();
        let (_dir, filename) = write_test_calls_vcf(&store, &call_set);
        let records = read_vcf_records(&filename);
        assert_eq!(records.len(), 1);
        for record in records.iter() {
            assert!(record.contains("\tincomplete\t"));
            assert!(!record.contains("CHR2"));
        }
    }

    #[test]
    fn test_vcf_header() {
        let (store, call_set) = get_test_call_set();
        let (_dir, filename) = write_test_calls_vcf(&store, &call_set);
        let header = read_vcf_header(&filename);
        assert_eq!(header[0], "##fileformat=VCFv4.2");
        assert!(header.iter().any(|x| x == "##contig=<ID=chr1>"));
        assert!(header.iter().any(|x| x.starts_with("##ALT=<ID=DUP_INT,")));
        assert!(header.iter().any(|x| x.starts_with("##FILTER=<ID=incomplete,")));
        assert!(header.iter().any(|x| x.starts_with("##INFO=<ID=CLUSTERS,")));
        assert_eq!(
            header.last().unwrap(),
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO"
        );
    }
}

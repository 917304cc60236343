use rust_htslib::bcf;
use rust_htslib::bcf::header::Header;
use strum::IntoEnumIterator;

use crate::chrom_list::ChromList;
use crate::evidence::SvType;
use crate::genome_segment::GenomeSegment;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};

/// Builds common fields into a VCF header, upon which more output specific details can be added
///
/// Contig records are added in chromosome index order, so that each chromosome index can be
/// used directly as the record rid.
///
pub fn get_basic_vcf_header(chrom_list: &ChromList) -> Header {
    // htslib adds the fileformat and PASS filter records
    let mut header = Header::new();

    let date_string = chrono::Local::now().format("%Y%m%d").to_string();
    header.push_record(format!("##fileDate={date_string}").as_bytes());
    header.push_record(format!("##source=\"{PROGRAM_NAME} {PROGRAM_VERSION}\"").as_bytes());
    let cmdline = std::env::args().collect::<Vec<_>>().join(" ");
    header.push_record(format!("##{PROGRAM_NAME}_cmdline=\"{cmdline}\"").as_bytes());

    for chrom_info in chrom_list.data.iter() {
        let header_contig_line = format!("##contig=<ID={}>", chrom_info.label);
        header.push_record(header_contig_line.as_bytes());
    }

    for sv_type in SvType::iter() {
        let header_alt_line = format!(
            "##ALT=<ID={},Description=\"{sv_type:?}\">",
            sv_type.label()
        );
        header.push_record(header_alt_line.as_bytes());
    }

    header
}

/// INFO records shared by all SV outputs
///
/// These need to follow any FILTER records added to the header.
///
pub fn push_shared_info_records(header: &mut Header) {
    let records: Vec<&[u8]> = vec![
        br#"##INFO=<ID=SVTYPE,Number=1,Type=String,Description="Type of structural variant">"#,
        br#"##INFO=<ID=END,Number=1,Type=Integer,Description="End position of the variant described in this record">"#,
        br#"##INFO=<ID=SVLEN,Number=1,Type=Integer,Description="Length of structural variant">"#,
        br#"##INFO=<ID=SUPPORT,Number=1,Type=Integer,Description="Number of evidence signatures supporting the record">"#,
    ];
    for x in records.into_iter() {
        header.push_record(x);
    }
}

/// Convert a zero-based half-open segment into one-based VCF start and end positions
pub fn get_vcf_pos_end(segment: &GenomeSegment) -> (i64, i64) {
    let pos = segment.range.start + 1;
    (pos, std::cmp::max(pos, segment.range.end))
}

/// Start a symbolic SV record at the given segment
///
/// Sets CHROM, POS, ID, REF, ALT, a missing QUAL and the SVTYPE and END info tags.
///
pub fn get_symbolic_sv_record(
    vcf: &bcf::Writer,
    segment: &GenomeSegment,
    id: &str,
    sv_type: SvType,
) -> bcf::Record {
    let (pos, end) = get_vcf_pos_end(segment);

    let mut record = vcf.empty_record();
    record.set_rid(Some(segment.chrom_index as u32));
    record.set_pos(pos - 1);
    record.set_id(id.as_bytes()).unwrap();

    let alt_seq = format!("<{}>", sv_type.label());
    record
        .set_alleles(&[b"N".as_slice(), alt_seq.as_bytes()])
        .unwrap();
    record.set_qual(bcf::record::Numeric::missing());

    add_sv_type(sv_type, &mut record);
    record.push_info_integer(b"END", &[end as i32]).unwrap();
    record
}

/// Add the SVTYPE info tag to a bcf record
fn add_sv_type(sv_type: SvType, record: &mut bcf::Record) {
    record
        .push_info_string(b"SVTYPE", &[sv_type.label().as_bytes()])
        .unwrap();
}

pub fn add_support(support: usize, record: &mut bcf::Record) {
    record
        .push_info_integer(b"SUPPORT", &[support as i32])
        .unwrap();
}

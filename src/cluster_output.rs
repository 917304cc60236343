//! Writers for the evidence cluster outputs
//!

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use log::info;
use rust_htslib::bcf;
use serde::Serialize;
use unwrap::unwrap;

use crate::chrom_list::ChromList;
use crate::cluster_evidence::{ClusterArena, ClusterId, EvidenceCluster};
use crate::evidence::EvidenceSignature;
use crate::globals::PROGRAM_NAME;
use crate::vcf_utils;

pub const CLUSTER_BED_FILENAME: &str = "evidence_clusters.bed";
pub const CLUSTER_VCF_FILENAME: &str = "evidence_clusters.vcf";
pub const CLUSTER_CACHE_FILENAME: &str = "evidence_clusters.mpack";

/// All clusters in genomic order, ties going to the lower arena index
fn get_sorted_clusters(arena: &ClusterArena) -> Vec<(ClusterId, &EvidenceCluster)> {
    let mut clusters = arena.iter().collect::<Vec<_>>();
    clusters.sort_by_key(|(id, x)| (x.representative, *id));
    clusters
}

/// Write one bed line per evidence cluster, using the IGV gffTags format to display multiple
/// key/value pairs in column 4
///
/// Clusters are written in genomic order. The cluster name is its arena index, which is also
/// used to refer to clusters from the call output.
///
fn write_cluster_bed_records(
    f: &mut impl Write,
    chrom_list: &ChromList,
    arena: &ClusterArena,
) -> std::io::Result<()> {
    writeln!(f, "#gffTags")?;
    for (ClusterId(cluster_index), cluster) in get_sorted_clusters(arena) {
        let rep = &cluster.representative;
        writeln!(
            f,
            "{}\t{}\t{}\tName={cluster_index};Type={};Role={:?};Support={};MeanMapq={:.1}",
            chrom_list.label(rep.chrom_index),
            rep.range.start,
            rep.range.end,
            cluster.sv_type,
            cluster.role,
            cluster.support(),
            cluster.mean_mapq,
        )?;
    }
    Ok(())
}

pub fn write_evidence_clusters_bed(
    output_dir: &Utf8Path,
    chrom_list: &ChromList,
    arena: &ClusterArena,
) {
    let filename = output_dir.join(CLUSTER_BED_FILENAME);
    info!("Writing evidence clusters to bed file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create evidence cluster bed file: '{filename}'"
    );
    let mut f = BufWriter::new(f);
    unwrap!(
        write_cluster_bed_records(&mut f, chrom_list, arena),
        "Unable to write evidence cluster bed file: '{filename}'"
    );
}

fn get_clusters_vcf_header(chrom_list: &ChromList) -> bcf::Header {
    let mut header = vcf_utils::get_basic_vcf_header(chrom_list);
    vcf_utils::push_shared_info_records(&mut header);

    let records: Vec<&[u8]> = vec![
        br#"##INFO=<ID=ROLE,Number=1,Type=String,Description="Evidence axis the cluster was built on">"#,
        br#"##INFO=<ID=MEANMAPQ,Number=1,Type=Float,Description="Mean mapping quality of the cluster evidence">"#,
    ];
    for x in records.into_iter() {
        header.push_record(x);
    }

    header
}

fn convert_cluster_to_vcf_record(
    vcf: &bcf::Writer,
    cluster_index: usize,
    cluster: &EvidenceCluster,
) -> bcf::Record {
    let id = format!("{PROGRAM_NAME}.cluster.{cluster_index}");
    let mut record =
        vcf_utils::get_symbolic_sv_record(vcf, &cluster.representative, &id, cluster.sv_type);
    vcf_utils::add_support(cluster.support(), &mut record);
    let role = format!("{:?}", cluster.role);
    record
        .push_info_string(b"ROLE", &[role.as_bytes()])
        .unwrap();
    record
        .push_info_float(b"MEANMAPQ", &[cluster.mean_mapq as f32])
        .unwrap();
    record.push_filter("PASS".as_bytes()).unwrap();
    record
}

/// Write one VCF record per evidence cluster, in genomic order
///
/// The record ID ends in the cluster's arena index, matching the bed output and the CLUSTERS
/// tag of the call output.
///
pub fn write_evidence_clusters_vcf(
    output_dir: &Utf8Path,
    chrom_list: &ChromList,
    arena: &ClusterArena,
) {
    let filename = output_dir.join(CLUSTER_VCF_FILENAME);
    info!("Writing evidence clusters to vcf file: '{filename}'");

    let header = get_clusters_vcf_header(chrom_list);
    let mut vcf = unwrap!(
        bcf::Writer::from_path(&filename, &header, true, bcf::Format::Vcf),
        "Unable to create evidence cluster vcf file: '{filename}'"
    );

    for (ClusterId(cluster_index), cluster) in get_sorted_clusters(arena) {
        let record = convert_cluster_to_vcf_record(&vcf, cluster_index, cluster);
        unwrap!(
            vcf.write(&record),
            "Unable to write evidence cluster vcf file: '{filename}'"
        );
    }
}

/// Everything needed to interpret the clusters outside of this run
#[derive(Serialize)]
struct ClusterCache<'a> {
    chrom_list: &'a ChromList,
    evidence: &'a [EvidenceSignature],
    arena: &'a ClusterArena,
}

/// Serialize all evidence clusters with their member evidence to MessagePack
pub fn write_cluster_cache(
    output_dir: &Utf8Path,
    chrom_list: &ChromList,
    evidence: &[EvidenceSignature],
    arena: &ClusterArena,
) {
    let mut buf = Vec::new();
    let cache = ClusterCache {
        chrom_list,
        evidence,
        arena,
    };
    cache
        .serialize(&mut rmp_serde::Serializer::new(&mut buf))
        .unwrap();

    let filename = output_dir.join(CLUSTER_CACHE_FILENAME);

    info!("Writing evidence clusters to binary file: '{filename}'");

    unwrap!(
        std::fs::write(&filename, buf.as_slice()),
        "Unable to open and write evidence cluster binary file: '{filename}'"
    );
}

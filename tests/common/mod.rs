//! Common test utilities

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use geopipe::config::Config;
use geopipe::pipeline::{Context, Task};
use geopipe::tasks::{build_pipeline, MirrorRemote, PipelineParams, Remote};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Columns the default configuration drops from the Probes table
pub const DROPPED: &[&str] = &[
    "Definition",
    "Ontology_Component",
    "Ontology_Process",
    "Ontology_Function",
    "Synonyms",
    "Obsolete_Probe_Id",
    "Probe_Sequence",
];

/// A sample text file with every section the default configuration writes
pub fn sample_text() -> String {
    let mut probes_header = vec!["Species", "Source", "Search_Key", "Probe_Id"];
    probes_header.extend_from_slice(DROPPED);
    probes_header.push("Array_Address_Id");

    let probes_row = [
        "Homo sapiens",
        "RefSeq",
        "NM_001",
        "ILMN_1343291",
        "eukaryotic translation elongation factor",
        "cytosol",
        "translational elongation",
        "GTP binding",
        "EF1A",
        "",
        "TCAAAGACTATGCCTCC",
        "3450719",
    ];

    format!(
        "[Heading]\nDescriptor\tSample\nScan\tGSM1\n\n[Probes]\n{}\n{}\n\n[Controls]\nArray_Address_Id\tProbe_Id\n1\tILMN_2\n\n[Columns]\nName\tType\nMIN_Signal\tfloat\n",
        probes_header.join("\t"),
        probes_row.join("\t"),
    )
}

/// Write a tar archive whose members are gzipped text files
pub fn write_archive(path: &Path, members: &[(&str, &str)]) {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    for (name, text) in members {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        let data = encoder.finish().unwrap();

        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}.gz", name), data.as_slice())
            .unwrap();
    }
    builder.finish().unwrap();
}

/// A mirror directory serving `GSE68849_RAW.tar` with the given members,
/// next to an unrelated file the link pattern must not pick
pub fn create_mirror(members: &[(&str, &str)]) -> TempDir {
    let mirror = TempDir::new().unwrap();
    fs::write(mirror.path().join("filelist.txt"), "#Archive/File\n").unwrap();
    write_archive(&mirror.path().join("GSE68849_RAW.tar"), members);
    mirror
}

/// A mirror serving one well-formed sample
pub fn create_sample_mirror() -> TempDir {
    create_mirror(&[("GSM1684095_sample.txt", sample_text().as_str())])
}

/// Default pipeline parameters over a mirror, rooted at `work/data`
pub fn pipeline_params(work: &Path, mirror: &Path) -> Arc<PipelineParams> {
    let remote: Arc<dyn Remote> = Arc::new(MirrorRemote::new(mirror));
    Arc::new(PipelineParams::from_config(&Config::default(), work.join("data"), remote).unwrap())
}

/// Terminal task plus a context rooted in `work`
pub fn pipeline(params: Arc<PipelineParams>, work: &Path) -> (Arc<dyn Task>, Context) {
    let ctx = Context::new().with_working_dir(work.to_path_buf());
    (build_pipeline(params), ctx)
}

/// The header row of a written table
pub fn header_of(path: PathBuf) -> Vec<String> {
    let text = fs::read_to_string(&path).unwrap();
    text.lines()
        .next()
        .unwrap_or("")
        .split('\t')
        .map(|s| s.to_string())
        .collect()
}

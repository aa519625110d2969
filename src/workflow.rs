/// Run-mode implementations
///
/// Every catalog mode takes the (possibly restricted) target catalog and the
/// parsed parameters, reads its inputs once and writes its reports under
/// `--out-prefix`.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::Error;
use crate::io::{count_bases, load_calls, AlignmentReader, InsertionCall, SequenceFormat};
use crate::params::Parameters;
use crate::report::{draw_insertion, write_sequence_table, SequenceRow, SplitReadTable, TableEntry};
use crate::split::{classify, is_consistent, project, SplitDirection, SplitReadRange};
use crate::stats::{CoverageReport, MatchSummary};
use crate::target::{
    near_breakpoints, CandidateMatcher, MatchOutcome, NameMatch, TargetCatalog, TargetSite,
};

pub const CALL_TABLE_FILE: &str = "split_reads_for_tgt.csv";
pub const SEQUENCE_TABLE_FILE: &str = "split_read_sequence_table.csv";
pub const COVERAGE_FILE: &str = "coverage.txt";

/// Mapper output expected in each sample directory
pub const SAMPLE_CALLS_FILE: &str = "te_mapper_output.json";
/// Genome alignments of transposon-paired reads in each sample directory
pub const SAMPLE_ALIGNMENTS_FILE: &str = "genome_aligned.sam";

fn required<'a>(value: &'a Option<PathBuf>, flag: &str) -> Result<&'a Path, Error> {
    value
        .as_deref()
        .ok_or_else(|| Error::Parameter(format!("{flag} is required")))
}

/// Match every target against breakpoint calls and write the split-read table.
pub fn call_table(params: &Parameters, catalog: &TargetCatalog) -> Result<(), Error> {
    let calls_path = required(&params.calls, "--calls")?;
    let calls = load_calls(calls_path)?;
    info!(
        "Loaded {} insertion calls from {}",
        calls.len(),
        calls_path.display()
    );

    let matcher = CandidateMatcher::window(params.te_name_match, params.call_cutoff());
    info!(
        "Matching with {} TE names, call cutoff {} bp",
        params.te_name_match,
        params.call_cutoff()
    );

    let out_path = params.output_path(CALL_TABLE_FILE);
    let mut table = SplitReadTable::create(&out_path)?;
    let mut summary = MatchSummary::new();

    for target in catalog {
        match matcher.find(target, &calls)? {
            MatchOutcome::Found(call) => {
                summary.record_match();
                table.write_entry(&TableEntry::from_call(target, call))?;
            }
            MatchOutcome::NotFound => summary.record_missing(&target.name),
        }
    }
    table.flush()?;

    summary.print_summary(&calls_path.display().to_string());
    info!("Wrote {}", out_path.display());
    Ok(())
}

/// Insertion span drawn for a call: the catalog length when known,
/// otherwise the breakpoint distance.
fn call_span(target: &TargetSite, call: &InsertionCall) -> Result<u64, Error> {
    if let Some(length) = target.length {
        return Ok(length);
    }
    if call.downstream_pos < call.upstream_pos {
        return Err(Error::Diagram(format!(
            "call for {} has downstream breakpoint {} before upstream breakpoint {}",
            target.name, call.downstream_pos, call.upstream_pos
        )));
    }
    Ok(call.downstream_pos - call.upstream_pos + 1)
}

/// Draw one diagram per target; every target must have a call starting at
/// its position.
pub fn call_diagrams(params: &Parameters, catalog: &TargetCatalog) -> Result<(), Error> {
    let calls_path = required(&params.calls, "--calls")?;
    let calls = load_calls(calls_path)?;
    info!(
        "Loaded {} insertion calls from {}",
        calls.len(),
        calls_path.display()
    );

    let matcher = CandidateMatcher::upstream_breakpoint(params.te_name_match);
    for target in catalog {
        let call = matcher.find_required(target, &calls)?;
        let span = call_span(target, call)?;
        let path = params.output_path(&format!("figure_{}.png", target.name));
        draw_insertion(&path, span, &call.upstream_reads, &call.downstream_reads)?;
        info!(
            "Wrote {} ({} upstream, {} downstream reads, {} bp)",
            path.display(),
            call.upstream_reads.len(),
            call.downstream_reads.len(),
            span
        );
    }
    Ok(())
}

/// Which alignment source a read selection scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Genome-only alignments: no TE identity, CIGAR must be a split
    Genome,
    /// Transposon-paired alignments with composite read identifiers
    Transposon,
}

impl ReadSource {
    fn matcher(&self, params: &Parameters) -> CandidateMatcher {
        match self {
            Self::Genome => CandidateMatcher::window(NameMatch::Any, params.genome_read_cutoff),
            Self::Transposon => {
                CandidateMatcher::window(params.te_name_match, params.te_read_cutoff)
            }
        }
    }
}

/// Output of one target in a read selection
struct ReadSink<'a> {
    target: &'a TargetSite,
    path: PathBuf,
    writer: BufWriter<File>,
    count: u64,
}

/// Copy alignment lines near each target to `{prefix}{name}_reads.txt`.
pub fn select_reads(
    params: &Parameters,
    catalog: &TargetCatalog,
    source: ReadSource,
) -> Result<(), Error> {
    let alignments = required(&params.alignments, "--alignments")?;
    let matcher = source.matcher(params);
    info!("Selecting {:?} reads from {}", source, alignments.display());

    let mut sinks = catalog
        .iter()
        .map(|target| {
            let path = params.output_path(&format!("{}_reads.txt", target.name));
            let file = File::create(&path).map_err(|e| Error::io(e, &path))?;
            Ok::<_, Error>(ReadSink {
                target,
                path,
                writer: BufWriter::new(file),
                count: 0,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut reader = AlignmentReader::open(alignments)?;
    while let Some(record) = reader.next_record()? {
        if source == ReadSource::Genome {
            let keep = classify(&record.cigar, params.cigar_mode)
                .is_some_and(|split| params.clip_side.keeps(split.direction));
            if !keep {
                reader.stats_mut().rejected_cigar += 1;
                continue;
            }
        }

        let mut kept = false;
        for sink in sinks.iter_mut() {
            if matcher.accepts(sink.target, &record) {
                writeln!(sink.writer, "{}", record.line).map_err(|e| Error::io(e, &sink.path))?;
                sink.count += 1;
                kept = true;
            }
        }
        if kept {
            reader.stats_mut().kept += 1;
        }
    }
    reader.stats().print_summary(&alignments.display().to_string());

    for sink in sinks.iter_mut() {
        sink.writer.flush().map_err(|e| Error::io(e, &sink.path))?;
        info!(
            "{}: {} reads written to {}",
            sink.target.name,
            sink.count,
            sink.path.display()
        );
    }
    Ok(())
}

/// Read-level modes work on one target's selected reads.
fn single_target(catalog: &TargetCatalog) -> Result<&TargetSite, Error> {
    let mut targets = catalog.iter();
    match (targets.next(), targets.next()) {
        (Some(target), None) => Ok(target),
        _ => Err(Error::Parameter(format!(
            "--target-name is required: the catalog holds {} targets",
            catalog.len()
        ))),
    }
}

/// Classify every record of an alignment file into upstream and downstream
/// split-read ranges, in file order.
pub fn collect_split_reads(
    params: &Parameters,
    path: &Path,
) -> Result<(Vec<SplitReadRange>, Vec<SplitReadRange>), Error> {
    let mut upstream = Vec::new();
    let mut downstream = Vec::new();

    let mut reader = AlignmentReader::open(path)?;
    while let Some(record) = reader.next_record()? {
        let split = match classify(&record.cigar, params.cigar_mode) {
            Some(split) if params.clip_side.keeps(split.direction) => split,
            _ => {
                reader.stats_mut().rejected_cigar += 1;
                continue;
            }
        };
        reader.stats_mut().kept += 1;
        match split.direction {
            SplitDirection::Upstream => upstream.push(project(&split)),
            SplitDirection::Downstream => downstream.push(project(&split)),
        }
    }
    reader.stats().print_summary(&path.display().to_string());

    Ok((upstream, downstream))
}

/// Split-read table of one target's selected reads
pub fn read_table(params: &Parameters, catalog: &TargetCatalog) -> Result<(), Error> {
    let target = single_target(catalog)?;
    let alignments = required(&params.alignments, "--alignments")?;
    let (upstream, downstream) = collect_split_reads(params, alignments)?;

    let out_path = params.output_path(&format!("{}_reads.csv", target.name));
    let mut table = SplitReadTable::create(&out_path)?;
    table.write_entry(&TableEntry::from_target(target, &upstream, &downstream))?;
    table.flush()?;

    info!(
        "Wrote {} ({} upstream, {} downstream reads)",
        out_path.display(),
        upstream.len(),
        downstream.len()
    );
    Ok(())
}

/// Diagram of one target's selected reads against an insertion of known length
pub fn read_diagram(params: &Parameters, catalog: &TargetCatalog) -> Result<(), Error> {
    let target = single_target(catalog)?;
    let alignments = required(&params.alignments, "--alignments")?;
    let span = params
        .insertion_length
        .ok_or_else(|| Error::Parameter("--insertion-length is required".into()))?;
    let (upstream, downstream) = collect_split_reads(params, alignments)?;

    let out_path = params.output_path(&format!("figure_{}_upstream.png", target.name));
    draw_insertion(&out_path, span, &upstream, &downstream)?;
    info!(
        "Wrote {} ({} upstream, {} downstream reads, {} bp)",
        out_path.display(),
        upstream.len(),
        downstream.len(),
        span
    );
    Ok(())
}

/// Row label of a sample directory: its name plus `--sample-suffix`
pub fn sample_label(dir: &Path, suffix: &str) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| dir.as_os_str().to_string_lossy());
    format!("{name}{suffix}")
}

/// Supporting reads of one sample's matched insertions
fn sample_sequences(
    params: &Parameters,
    catalog: &TargetCatalog,
    dir: &Path,
) -> Result<Vec<SequenceRow>, Error> {
    let sample = sample_label(dir, &params.sample_suffix);
    let cutoff = params.call_cutoff();

    let calls = load_calls(&dir.join(SAMPLE_CALLS_FILE))?;
    let matcher = CandidateMatcher::window(params.te_name_match, cutoff);
    let mut summary = MatchSummary::new();
    let mut matched: Vec<(&TargetSite, &InsertionCall)> = Vec::new();
    for target in catalog {
        match matcher.find(target, &calls)? {
            MatchOutcome::Found(call) => {
                summary.record_match();
                matched.push((target, call));
            }
            MatchOutcome::NotFound => summary.record_missing(&target.name),
        }
    }
    summary.print_summary(&sample);
    if matched.is_empty() {
        return Ok(Vec::new());
    }

    let alignments = dir.join(SAMPLE_ALIGNMENTS_FILE);
    let mut reader = AlignmentReader::open(&alignments)?;
    let mut rows = Vec::new();
    while let Some(record) = reader.next_record()? {
        let Some(split) = classify(&record.cigar, params.cigar_mode) else {
            reader.stats_mut().rejected_cigar += 1;
            continue;
        };

        let sequence = record.sequence.as_deref().unwrap_or("");
        if params.read_length > 0 && sequence.len() as u64 != params.read_length {
            reader.stats_mut().wrong_length += 1;
            continue;
        }

        let te = match &record.te {
            Some(te) if is_consistent(&split, te) => te,
            _ => {
                reader.stats_mut().inconsistent += 1;
                continue;
            }
        };

        let mut kept = false;
        for (target, call) in &matched {
            if params.te_name_match.matches(&target.te_name, Some(te.family.as_str()))
                && record.chrom == call.chrom
                && near_breakpoints(call, record.pos, cutoff)
            {
                debug!("{}: read {} supports {}", sample, te.query, target.name);
                rows.push(SequenceRow {
                    sample: sample.clone(),
                    insertion: target.name.clone(),
                    natural_te: te.family.clone(),
                    direction: split.direction,
                    sequence: sequence.to_string(),
                });
                kept = true;
            }
        }
        if kept {
            reader.stats_mut().kept += 1;
        }
    }
    reader.stats().print_summary(&alignments.display().to_string());

    Ok(rows)
}

/// Collect supporting read sequences of matched insertions across samples.
pub fn sequence_table(params: &Parameters, catalog: &TargetCatalog) -> Result<(), Error> {
    let mut rows = Vec::new();
    for dir in &params.sample_dirs {
        info!("Sample directory: {}", dir.display());
        rows.extend(sample_sequences(params, catalog, dir)?);
    }

    let out_path = params.output_path(SEQUENCE_TABLE_FILE);
    write_sequence_table(&out_path, &rows)?;
    info!("Wrote {} ({} reads)", out_path.display(), rows.len());
    Ok(())
}

/// Read depth of a FASTQ read set over a FASTA reference.
pub fn coverage(params: &Parameters) -> Result<(), Error> {
    let reference = required(&params.reference, "--reference")?;
    let reads = required(&params.reads, "--reads")?;

    let report = CoverageReport {
        reference_nt: count_bases(reference, SequenceFormat::Fasta)?,
        reads_nt: count_bases(reads, SequenceFormat::Fastq)?,
    };
    report.print_summary();
    if report.depth().is_none() {
        warn!("{}: reference has no bases", reference.display());
    }

    let out_path = params.output_path(COVERAGE_FILE);
    std::fs::write(&out_path, report.to_string()).map_err(|e| Error::io(e, &out_path))?;
    info!("Wrote {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    const CATALOG: &str = "SX4Et51\tcopia\t2R\t9237984\nSX4Ch7\t1360\t2L\t12004570\t3409\n";

    const CALLS: &str = r#"[
        {
            "reference": [],
            "non_reference": [
                {
                    "name": "copia#LTR/Copia",
                    "chrom": "2R",
                    "upstream_pos": 9237984,
                    "downstream_pos": 9243126,
                    "orientation": "PlusPlus",
                    "upstream_reads": [{"te_range": [101, 150], "genome_range": [1, 100]}],
                    "downstream_reads": [{"te_range": [1, 30], "genome_range": [31, 150]}]
                },
                {
                    "name": "1360#DNA/P",
                    "chrom": "2L",
                    "upstream_pos": 12004570,
                    "downstream_pos": 12004575,
                    "orientation": "PlusMinus",
                    "upstream_reads": [],
                    "downstream_reads": [{"te_range": [1, 20], "genome_range": [21, 150]}]
                }
            ]
        }
    ]"#;

    fn params(dir: &Path, args: &[&str]) -> Parameters {
        let targets = dir.join("targets.tsv");
        let prefix = format!("{}/", dir.display());
        let mut full = vec![
            "tesplit".to_string(),
            "--targets".to_string(),
            targets.display().to_string(),
            "--out-prefix".to_string(),
            prefix,
        ];
        full.extend(args.iter().map(|a| a.to_string()));
        Parameters::parse_from(full)
    }

    fn sam_line(name: &str, chrom: &str, pos: u64, cigar: &str, seq_len: usize) -> String {
        let seq = "A".repeat(seq_len);
        let qual = "I".repeat(seq_len);
        format!("{name}\t0\t{chrom}\t{pos}\t60\t{cigar}\t*\t0\t0\t{seq}\t{qual}\n")
    }

    fn setup() -> (tempfile::TempDir, TargetCatalog) {
        let dir = tempfile::tempdir().unwrap();
        let targets = dir.path().join("targets.tsv");
        fs::write(&targets, CATALOG).unwrap();
        fs::write(dir.path().join("calls.json"), CALLS).unwrap();
        let catalog = TargetCatalog::from_path(&targets).unwrap();
        (dir, catalog)
    }

    #[test]
    fn test_call_table() {
        let (dir, catalog) = setup();
        let calls = dir.path().join("calls.json");
        let p = params(dir.path(), &["--calls", calls.to_str().unwrap()]);
        call_table(&p, &catalog).unwrap();

        let text = fs::read_to_string(dir.path().join(CALL_TABLE_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 2 + 2);
        assert!(lines[1].starts_with("SX4Et51,copia#LTR/Copia,2R,9237984,9243126,+/+,"));
        assert_eq!(lines[2], ",,,,,,,101,150,1,100,1,30,31,150");
        assert!(lines[3].starts_with("SX4Ch7,1360#DNA/P,2L,12004570,12004575,+/-,"));
    }

    #[test]
    fn test_call_table_exact_names_miss() {
        let (dir, catalog) = setup();
        let calls = dir.path().join("calls.json");
        let p = params(
            dir.path(),
            &["--calls", calls.to_str().unwrap(), "--te-name-match", "exact"],
        );
        call_table(&p, &catalog).unwrap();

        let text = fs::read_to_string(dir.path().join(CALL_TABLE_FILE)).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_call_table_ambiguous() {
        let (dir, catalog) = setup();
        // the same call twice makes SX4Et51 ambiguous
        let doubled = format!("[{0}, {0}]", &CALLS.trim()[1..CALLS.trim().len() - 1]);
        let calls = dir.path().join("doubled.json");
        fs::write(&calls, doubled).unwrap();
        let p = params(dir.path(), &["--calls", calls.to_str().unwrap()]);

        let err = call_table(&p, &catalog).unwrap_err();
        match err {
            Error::AmbiguousTarget { target, count } => {
                assert_eq!(target, "SX4Et51");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_call_diagrams() {
        let (dir, catalog) = setup();
        let calls = dir.path().join("calls.json");
        let p = params(
            dir.path(),
            &["--run-mode", "call-diagrams", "--calls", calls.to_str().unwrap()],
        );
        call_diagrams(&p, &catalog).unwrap();
        assert!(dir.path().join("figure_SX4Et51.png").exists());
        assert!(dir.path().join("figure_SX4Ch7.png").exists());
    }

    #[test]
    fn test_call_diagrams_missing_target_is_fatal() {
        let (dir, _) = setup();
        let targets = dir.path().join("targets.tsv");
        fs::write(&targets, "SX4Et49\tcopia\t2R\t9237000\n").unwrap();
        let catalog = TargetCatalog::from_path(&targets).unwrap();
        let calls = dir.path().join("calls.json");
        let p = params(
            dir.path(),
            &["--run-mode", "call-diagrams", "--calls", calls.to_str().unwrap()],
        );
        let err = call_diagrams(&p, &catalog).unwrap_err();
        assert!(matches!(err, Error::TargetNotFound(ref name) if name == "SX4Et49"));
    }

    #[test]
    fn test_call_span() {
        let target = TargetSite::new("SX4Et51", "copia", "2R", 100);
        let mut call = load_call();
        call.upstream_pos = 100;
        call.downstream_pos = 199;
        assert_eq!(call_span(&target, &call).unwrap(), 100);
        assert_eq!(call_span(&target.clone().with_length(5143), &call).unwrap(), 5143);
        call.downstream_pos = 50;
        assert!(call_span(&target, &call).is_err());
    }

    fn load_call() -> InsertionCall {
        crate::io::calls::parse_calls(CALLS).unwrap().remove(0)
    }

    #[test]
    fn test_select_genome_reads() {
        let (dir, catalog) = setup();
        let sam = dir.path().join("genome.sam");
        let mut content = String::from("@SQ\tSN:2R\tLN:25286936\n");
        content.push_str(&sam_line("near_split", "2R", 9_237_600, "100M50S", 150));
        content.push_str(&sam_line("near_unsplit", "2R", 9_237_600, "150M", 150));
        content.push_str(&sam_line("far_split", "2R", 9_239_000, "20S130M", 150));
        content.push_str(&sam_line("other_chrom", "2L", 9_237_984, "20S130M", 150));
        content.push_str(&sam_line("ch7_split", "2L", 12_004_500, "20S130M", 150));
        fs::write(&sam, content).unwrap();

        let p = params(
            dir.path(),
            &["--run-mode", "select-genome-reads", "--alignments", sam.to_str().unwrap()],
        );
        select_reads(&p, &catalog, ReadSource::Genome).unwrap();

        let et51 = fs::read_to_string(dir.path().join("SX4Et51_reads.txt")).unwrap();
        assert_eq!(et51.lines().count(), 1);
        assert!(et51.starts_with("near_split\t"));
        let ch7 = fs::read_to_string(dir.path().join("SX4Ch7_reads.txt")).unwrap();
        assert!(ch7.starts_with("ch7_split\t"));
    }

    #[test]
    fn test_select_te_reads_uses_family() {
        let (dir, catalog) = setup();
        let sam = dir.path().join("te.sam");
        let mut content = String::new();
        content.push_str(&sam_line("q1|copia#LTR/Copia|50|100", "2R", 9_245_000, "150M", 150));
        content.push_str(&sam_line("q2|1360#DNA/P|50|100", "2R", 9_237_984, "150M", 150));
        content.push_str(&sam_line("q3", "2R", 9_237_984, "150M", 150));
        fs::write(&sam, content).unwrap();

        let p = params(
            dir.path(),
            &["--run-mode", "select-te-reads", "--alignments", sam.to_str().unwrap()],
        );
        select_reads(&p, &catalog, ReadSource::Transposon).unwrap();

        let et51 = fs::read_to_string(dir.path().join("SX4Et51_reads.txt")).unwrap();
        assert_eq!(et51.lines().count(), 1);
        assert!(et51.starts_with("q1|copia"));
        let ch7 = fs::read_to_string(dir.path().join("SX4Ch7_reads.txt")).unwrap();
        assert!(ch7.is_empty());
    }

    #[test]
    fn test_read_table_needs_single_target() {
        let (dir, catalog) = setup();
        let sam = dir.path().join("reads.txt");
        fs::write(&sam, sam_line("r1", "2L", 12_004_500, "100M50S", 150)).unwrap();
        let p = params(
            dir.path(),
            &["--run-mode", "read-table", "--alignments", sam.to_str().unwrap()],
        );
        assert!(matches!(read_table(&p, &catalog), Err(Error::Parameter(_))));

        let single = catalog.restrict_to("SX4Ch7").unwrap();
        read_table(&p, &single).unwrap();
        let text = fs::read_to_string(dir.path().join("SX4Ch7_reads.csv")).unwrap();
        let lines: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "SX4Ch7,1360,2L,12004570,,+/+,non-reference,,,,,,,,",
                ",,,,,,,101,150,1,100,,,,",
            ]
        );
    }

    #[test]
    fn test_collect_split_reads_respects_clip_side() {
        let (dir, _) = setup();
        let sam = dir.path().join("reads.txt");
        let mut content = sam_line("r1", "2L", 1, "100M50S", 150);
        content.push_str(&sam_line("r2", "2L", 1, "30S120M", 150));
        content.push_str(&sam_line("r3", "2L", 1, "50M2I98M", 150));
        fs::write(&sam, content).unwrap();

        let p = params(dir.path(), &[]);
        let (up, down) = collect_split_reads(&p, &sam).unwrap();
        assert_eq!(up.len(), 1);
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].te_range, (1, 30));

        let p = params(dir.path(), &["--clip-side", "upstream"]);
        let (up, down) = collect_split_reads(&p, &sam).unwrap();
        assert_eq!(up.len(), 1);
        assert!(down.is_empty());
    }

    #[test]
    fn test_read_diagram() {
        let (dir, catalog) = setup();
        let sam = dir.path().join("reads.txt");
        fs::write(&sam, sam_line("r1", "2L", 12_004_500, "100M50S", 150)).unwrap();
        let p = params(
            dir.path(),
            &[
                "--run-mode",
                "read-diagram",
                "--alignments",
                sam.to_str().unwrap(),
                "--insertion-length",
                "3409",
            ],
        );
        read_diagram(&p, &catalog.restrict_to("SX4Ch7").unwrap()).unwrap();
        assert!(dir.path().join("figure_SX4Ch7_upstream.png").exists());
    }

    #[test]
    fn test_sample_label() {
        assert_eq!(sample_label(Path::new("data/1_R1_001"), ".fastq"), "1_R1_001.fastq");
        assert_eq!(sample_label(Path::new("s2/"), ""), "s2");
    }

    #[test]
    fn test_sequence_table() {
        let (dir, catalog) = setup();
        let sample = dir.path().join("1_R1_001");
        fs::create_dir(&sample).unwrap();
        fs::write(sample.join(SAMPLE_CALLS_FILE), CALLS).unwrap();

        let mut sam = String::from("@HD\tVN:1.6\n");
        // consistent downstream read near the SX4Et51 upstream breakpoint
        sam.push_str(&sam_line("q1|copia#LTR/Copia|30|120", "2R", 9_237_990, "30S120M", 150));
        // genome match must equal the TE clip
        sam.push_str(&sam_line("q2|copia#LTR/Copia|30|100", "2R", 9_237_990, "30S120M", 150));
        // wrong read length
        sam.push_str(&sam_line("q3|copia#LTR/Copia|30|120", "2R", 9_237_990, "30S120M", 100));
        // beyond the 1000 bp window of both breakpoints
        sam.push_str(&sam_line("q4|copia#LTR/Copia|30|120", "2R", 9_250_000, "30S120M", 150));
        // upstream read supporting SX4Ch7
        sam.push_str(&sam_line("q5|1360#DNA/P|50|100", "2L", 12_004_480, "100M50S", 150));
        fs::write(sample.join(SAMPLE_ALIGNMENTS_FILE), sam).unwrap();

        let p = params(
            dir.path(),
            &["--run-mode", "sequence-table", "--sample-dirs", sample.to_str().unwrap()],
        );
        sequence_table(&p, &catalog).unwrap();

        let text = fs::read_to_string(dir.path().join(SEQUENCE_TABLE_FILE)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let seq = "A".repeat(150);
        assert_eq!(
            lines[1],
            format!("1_R1_001.fastq,SX4Et51,copia#LTR/Copia,Downstream,{seq}")
        );
        assert_eq!(lines[2], format!("1_R1_001.fastq,SX4Ch7,1360#DNA/P,Upstream,{seq}"));
    }

    #[test]
    fn test_coverage() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("ref.fa");
        fs::write(&reference, ">2L\nACGTACGTAC\n>2R\nACGTACGTAC\n").unwrap();
        let reads = dir.path().join("reads.fastq");
        fs::write(&reads, "@r1\nACGTA\n+\nIIIII\n@r2\nACGTA\n+\nIIIII\n").unwrap();

        let p = Parameters::parse_from([
            "tesplit".to_string(),
            "--run-mode".to_string(),
            "coverage".to_string(),
            "--reference".to_string(),
            reference.display().to_string(),
            "--reads".to_string(),
            reads.display().to_string(),
            "--out-prefix".to_string(),
            format!("{}/", dir.path().display()),
        ]);
        coverage(&p).unwrap();

        let text = fs::read_to_string(dir.path().join(COVERAGE_FILE)).unwrap();
        assert_eq!(text, "reference nt: 20\nreads nt: 10\ncoverage: 0.5x\n");
    }
}

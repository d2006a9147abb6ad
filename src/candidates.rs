use std::collections::HashMap;

use crate::{
    config::Config,
    errors::{Result, SelectError},
    read::{AlignedRead, CigarOp},
    reference::RefSeq,
    region::Region,
};

/// Count of supporting reads per suspect reference position. Built fresh
/// per region and discarded after window assembly.
pub type CandidateMap = HashMap<i64, usize>;

fn base_eq(a: u8, b: u8) -> bool {
    a.eq_ignore_ascii_case(&b)
}

/// Walks one read's alignment path and returns the reference positions it
/// implicates, restricted to `region`.
///
/// Positions a read emits more than once appear more than once; the
/// aggregate count accumulates every emission.
pub fn read_candidates<R: RefSeq>(
    read: &AlignedRead,
    refs: &R,
    region: &Region,
    min_base_quality: u8,
) -> Result<Vec<i64>> {
    let seq = read.seq();
    let qual = read.qual();
    let mut pos = read.pos(); // cursor on the reference
    let mut ix = 0; // cursor into seq/qual
    let mut mapped = false; // set once a reference-consuming op has run
    let mut cand = Vec::new();

    for cig in read.cigar().iter() {
        let l = cig.op_len();
        match cig.op() {
            CigarOp::Match => {
                for k in 0..l {
                    let mismatch = refs
                        .base(pos + k as i64)
                        .map(|rb| !base_eq(rb, seq[ix + k]))
                        .unwrap_or(false);
                    if mismatch && qual[ix + k] >= min_base_quality {
                        cand.push(pos + k as i64)
                    }
                }
                pos += l as i64;
                ix += l;
                mapped = true;
            }
            CigarOp::Diff => {
                // Declared mismatch, so no base comparison
                for k in 0..l {
                    if qual[ix + k] >= min_base_quality {
                        cand.push(pos + k as i64)
                    }
                }
                pos += l as i64;
                ix += l;
                mapped = true;
            }
            CigarOp::Equal => {
                pos += l as i64;
                ix += l;
                mapped = true;
            }
            CigarOp::Del => {
                // No quality signal exists for the missing bases
                cand.extend(pos..pos + l as i64);
                pos += l as i64;
                mapped = true;
            }
            CigarOp::RefSkip => {
                pos += l as i64;
                mapped = true;
            }
            CigarOp::Ins => {
                // Spread the signal over a window straddling the insertion
                // point; each inserted base gates its mirrored pair
                for j in 0..l {
                    if qual[ix + j] >= min_base_quality {
                        cand.push(pos - l as i64 + j as i64);
                        cand.push(pos + j as i64);
                    }
                }
                ix += l;
            }
            CigarOp::SoftClip => {
                // A leading clip points back into unmapped territory, a
                // trailing clip forward past the mapped span
                let start = if mapped { pos } else { pos - l as i64 };
                for j in 0..l {
                    if qual[ix + j] >= min_base_quality {
                        cand.push(start + j as i64)
                    }
                }
                ix += l;
            }
            CigarOp::HardClip => (),
            op => {
                return Err(SelectError::UnsupportedOperation {
                    op,
                    read: read.qname().to_owned(),
                })
            }
        }
    }
    cand.retain(|p| region.contains(*p));
    Ok(cand)
}

/// Runs the extractor over every read passing the mapq gate and counts the
/// emissions observed at each position inside `region`.
///
/// Reads below the mapq gate contribute nothing; no reads, or no passing
/// reads, is an empty map, not an error.
pub fn collect_candidates<'a, R, I>(
    cfg: &Config,
    refs: &R,
    reads: I,
    region: &Region,
) -> Result<CandidateMap>
where
    R: RefSeq,
    I: IntoIterator<Item = &'a AlignedRead>,
{
    if region.start() > region.end() {
        return Err(SelectError::InvalidRegion(region.clone()));
    }

    let mut cmap = CandidateMap::new();
    let mut n_used = 0;
    let mut n_skipped = 0;
    for read in reads {
        if read.mapq() < cfg.min_mapq() {
            n_skipped += 1;
            continue;
        }
        let positions = read_candidates(read, refs, region, cfg.min_base_quality())?;
        trace!("Read {}: {} candidate emissions", read.qname(), positions.len());
        for p in positions {
            *cmap.entry(p).or_insert(0) += 1;
        }
        n_used += 1;
    }
    debug!(
        "Region {}: {} candidate positions from {} reads ({} below mapq {})",
        region,
        cmap.len(),
        n_used,
        n_skipped,
        cfg.min_mapq()
    );
    Ok(cmap)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::reference::Contig;

    fn mk_read(seq: &str, start: i64, cigar: &str, quals: &[u8]) -> AlignedRead {
        mk_mapped_read(seq, start, cigar, quals, 30)
    }

    fn mk_mapped_read(seq: &str, start: i64, cigar: &str, quals: &[u8], mapq: u8) -> AlignedRead {
        AlignedRead::new(
            "read1",
            "ref",
            start,
            mapq,
            cigar.parse().unwrap(),
            seq.as_bytes().to_vec(),
            quals.to_vec(),
        )
    }

    fn poly_a() -> Contig {
        Contig::new("ref", 0, &[b'A'; 120])
    }

    fn cfg() -> Config {
        Config::new(2, 10, 20, 20, 4)
    }

    fn sorted_candidates(read: &AlignedRead) -> Vec<i64> {
        let mut v =
            read_candidates(read, &poly_a(), &Region::new("ref", 0, 100), 20).unwrap();
        v.sort_unstable();
        v
    }

    #[rstest]
    // Basic position calculation per operation mix
    #[case("AAGA", "4M", &[64, 64, 64, 64], &[12])]
    #[case("AAGTA", "2M2I1M", &[64, 64, 64, 64, 64], &[10, 11, 12, 13])]
    #[case("AAA", "2M2D1M", &[64, 64, 64], &[12, 13])]
    #[case("TGATAC", "2S3M1S", &[64, 64, 64, 64, 64, 64], &[8, 9, 11, 13])]
    #[case("AAGA", "2M1X1M", &[64, 64, 64, 64], &[12])]
    // Low-quality bases are masked out
    #[case("AAGA", "4M", &[64, 64, 10, 30], &[])]
    #[case("AAGTA", "2M2I1M", &[64, 64, 10, 30, 64], &[11, 13])]
    #[case("TGATAC", "2S3M1S", &[64, 10, 64, 64, 64, 64], &[8, 11, 13])]
    #[case("AAGA", "2M1X1M", &[64, 64, 30, 10], &[12])]
    fn candidates_from_one_read(
        #[case] seq: &str,
        #[case] cigar: &str,
        #[case] quals: &[u8],
        #[case] expected: &[i64],
    ) {
        let read = mk_read(seq, 10, cigar, quals);
        assert_eq!(sorted_candidates(&read), expected);
    }

    #[rstest]
    // M consults the reference to decide
    #[case("A", "1M", &[])]
    #[case("C", "1M", &[10])]
    // X emits regardless of the actual bases
    #[case("A", "1X", &[10])]
    #[case("C", "1X", &[10])]
    // = never emits, even on a disagreeing base
    #[case("A", "1=", &[])]
    #[case("C", "1=", &[])]
    // D emits every deleted position
    #[case("A", "1M1D", &[11])]
    #[case("A", "1M2D", &[11, 12])]
    #[case("A", "1M3D", &[11, 12, 13])]
    // I emits mirrored pairs around the insertion point
    #[case("AA", "1M1I", &[10, 11])]
    #[case("AAA", "1M2I", &[9, 10, 11, 12])]
    #[case("AAAA", "1M3I", &[8, 9, 10, 11, 12, 13])]
    // S emits one position per clipped base
    #[case("AA", "1M1S", &[11])]
    #[case("AAA", "1M2S", &[11, 12])]
    #[case("AAAA", "1M3S", &[11, 12, 13])]
    // N and H are ignored
    #[case("AA", "1M1N1M", &[])]
    #[case("AA", "1M2N1M", &[])]
    #[case("A", "1M1H", &[])]
    fn candidates_for_each_op(#[case] seq: &str, #[case] cigar: &str, #[case] expected: &[i64]) {
        let quals = vec![64; seq.len()];
        let read = mk_read(seq, 10, cigar, &quals);
        assert_eq!(sorted_candidates(&read), expected);
    }

    #[rstest]
    #[case("AA", "1M1P1M")]
    #[case("AA", "1M2P1M")]
    fn pad_fails_extraction(#[case] seq: &str, #[case] cigar: &str) {
        let read = mk_read(seq, 10, cigar, &[64, 64]);
        let err = read_candidates(&read, &poly_a(), &Region::new("ref", 0, 100), 20).unwrap_err();
        assert!(matches!(
            err,
            SelectError::UnsupportedOperation { op: CigarOp::Pad, .. }
        ));
    }

    // A mismatch at read start + 1 yields that position alone, wherever the
    // read sits inside the region
    #[test]
    fn candidate_positions_do_not_depend_on_region_placement() {
        for region_start in 0..10 {
            for read_start in region_start..10 {
                let read = mk_read("AGA", read_start, "3M", &[64, 64, 64]);
                let region = Region::new("ref", region_start, region_start + 100);
                let cmap = collect_candidates(&cfg(), &poly_a(), [&read], &region).unwrap();
                let expected: CandidateMap = [(read_start + 1, 1)].into_iter().collect();
                assert_eq!(cmap, expected, "read at {}, region at {}", read_start, region_start);
            }
        }
    }

    #[test]
    fn candidates_clipped_to_region() {
        let region = Region::new("ref", 5, 8);
        for start in 0..10 {
            let read = mk_read("G", start, "1M", &[64]);
            let cmap = collect_candidates(&cfg(), &poly_a(), [&read], &region).unwrap();
            let expected: CandidateMap = if region.contains(start) {
                [(start, 1)].into_iter().collect()
            } else {
                CandidateMap::new()
            };
            assert_eq!(cmap, expected, "read at {}", start);
        }
    }

    #[test]
    fn deletion_clipped_to_region() {
        let region = Region::new("ref", 5, 8);
        for start in 0..10 {
            let read = mk_read("AA", start, "1M4D1M", &[64, 64]);
            let cmap = collect_candidates(&cfg(), &poly_a(), [&read], &region).unwrap();
            let expected: CandidateMap = (start + 1..start + 5)
                .filter(|p| region.contains(*p))
                .map(|p| (p, 1))
                .collect();
            assert_eq!(cmap, expected, "read at {}", start);
        }
    }

    #[test]
    fn mapq_gate_is_inclusive() {
        for read_mapq in 10..15u8 {
            for min_mapq in 8..17u8 {
                let cfg = Config::new(2, 10, min_mapq, 20, 4);
                let read = mk_mapped_read("AGA", 10, "3M", &[64, 64, 64], read_mapq);
                let region = Region::new("ref", 0, 100);
                let cmap = collect_candidates(&cfg, &poly_a(), [&read], &region).unwrap();
                let expected: CandidateMap = if read_mapq >= min_mapq {
                    [(11, 1)].into_iter().collect()
                } else {
                    CandidateMap::new()
                };
                assert_eq!(cmap, expected, "mapq {} vs gate {}", read_mapq, min_mapq);
            }
        }
    }

    #[test]
    fn counts_accumulate_across_reads() {
        let reads = vec![
            mk_read("AGA", 10, "3M", &[64, 64, 64]),
            mk_read("AGA", 10, "3M", &[63, 63, 63]),
            mk_read("AGA", 12, "3M", &[62, 62, 62]),
        ];
        let cmap =
            collect_candidates(&cfg(), &poly_a(), &reads, &Region::new("ref", 0, 100)).unwrap();
        let expected: CandidateMap = [(11, 2), (13, 1)].into_iter().collect();
        assert_eq!(cmap, expected);
    }

    #[test]
    fn duplicate_emissions_from_one_read_accumulate() {
        // The deleted base and the insertion mirror both nominate 11
        let read = mk_read("AC", 10, "1M1D1I", &[64, 64]);
        let cmap =
            collect_candidates(&cfg(), &poly_a(), [&read], &Region::new("ref", 0, 100)).unwrap();
        let expected: CandidateMap = [(11, 2), (12, 1)].into_iter().collect();
        assert_eq!(cmap, expected);
    }

    #[test]
    fn no_reads_is_an_empty_map() {
        let cmap = collect_candidates(
            &cfg(),
            &poly_a(),
            std::iter::empty::<&AlignedRead>(),
            &Region::new("ref", 0, 100),
        )
        .unwrap();
        assert!(cmap.is_empty());
    }

    #[test]
    fn reversed_region_is_rejected() {
        let err = collect_candidates(
            &cfg(),
            &poly_a(),
            std::iter::empty::<&AlignedRead>(),
            &Region::new("ref", 8, 5),
        )
        .unwrap_err();
        assert!(matches!(err, SelectError::InvalidRegion(_)));
    }

    #[test]
    fn pad_in_any_read_fails_the_whole_call() {
        let reads = vec![
            mk_read("AGA", 10, "3M", &[64, 64, 64]),
            mk_read("AA", 20, "1M1P1M", &[64, 64]),
        ];
        let res = collect_candidates(&cfg(), &poly_a(), &reads, &Region::new("ref", 0, 100));
        assert!(matches!(
            res,
            Err(SelectError::UnsupportedOperation { op: CigarOp::Pad, .. })
        ));
    }
}

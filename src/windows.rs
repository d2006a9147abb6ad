use crate::{
    candidates::{collect_candidates, CandidateMap},
    config::Config,
    errors::Result,
    read::AlignedRead,
    reference::RefSeq,
    region::Region,
};

/// Merges candidate positions with supporting-read counts inside the
/// configured band into realignment windows on `ctg`, ascending by start.
///
/// Positions no more than `min_windows_distance` apart share a window; each
/// group becomes `[first - d, last + d)`. Grouping is a single left-to-right
/// sweep over the raw positions, so two emitted windows may touch or overlap
/// without being re-merged.
pub fn build_windows(cfg: &Config, cmap: &CandidateMap, ctg: &str) -> Vec<Region> {
    let lo = cfg.min_supporting_reads();
    let hi = cfg.max_supporting_reads();
    let dist = cfg.min_windows_distance() as i64;

    let mut positions: Vec<i64> = cmap
        .iter()
        .filter(|(_, &n)| n >= lo && n <= hi)
        .map(|(&p, _)| p)
        .collect();
    positions.sort_unstable();

    let mut windows = Vec::new();
    let mut group: Option<(i64, i64)> = None; // first and last position of the open group
    for &p in positions.iter() {
        group = match group {
            Some((first, last)) if p - last <= dist => Some((first, p)),
            Some((first, last)) => {
                windows.push(Region::new(ctg, first - dist, last + dist));
                Some((p, p))
            }
            None => Some((p, p)),
        }
    }
    if let Some((first, last)) = group {
        windows.push(Region::new(ctg, first - dist, last + dist));
    }

    debug!(
        "{}: {} windows from {} candidate positions in band [{}, {}]",
        ctg,
        windows.len(),
        positions.len(),
        lo,
        hi
    );
    windows
}

/// Selects the realignment windows for `region`: candidate collection over
/// the passing reads, then window assembly. Pure composition, no state
/// kept across calls.
pub fn select_windows<'a, R, I>(
    cfg: &Config,
    refs: &R,
    reads: I,
    region: &Region,
) -> Result<Vec<Region>>
where
    R: RefSeq,
    I: IntoIterator<Item = &'a AlignedRead>,
{
    let cmap = collect_candidates(cfg, refs, reads, region)?;
    Ok(build_windows(cfg, &cmap, region.ctg()))
}

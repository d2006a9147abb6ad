//! Selection of candidate windows for local realignment.
//!
//! Reads aligned over a region nominate suspect reference positions from
//! their mismatches, indels and clipped ends; positions with enough
//! supporting reads are merged into the windows a realigner should
//! revisit. Read and reference I/O live with the caller, which supplies a
//! [`RefSeq`] accessor, the overlapping [`AlignedRead`]s and a [`Config`]
//! of thresholds.

#[macro_use]
extern crate log;

pub mod candidates;
pub mod config;
pub mod errors;
pub mod read;
pub mod reference;
pub mod region;
pub mod windows;

pub use candidates::{collect_candidates, read_candidates, CandidateMap};
pub use config::Config;
pub use errors::{Result, SelectError};
pub use read::{AlignedRead, Cigar, CigarElem, CigarOp};
pub use reference::{Contig, RefSeq};
pub use region::Region;
pub use windows::{build_windows, select_windows};

use std::{fmt, str::FromStr};

use crate::errors::SelectError;

/// Alignment operations, one per CIGAR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    Match,
    Ins,
    Del,
    RefSkip,
    SoftClip,
    HardClip,
    Pad,
    Equal,
    Diff,
}

impl CigarOp {
    fn code(&self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Ins => 'I',
            CigarOp::Del => 'D',
            CigarOp::RefSkip => 'N',
            CigarOp::SoftClip => 'S',
            CigarOp::HardClip => 'H',
            CigarOp::Pad => 'P',
            CigarOp::Equal => '=',
            CigarOp::Diff => 'X',
        }
    }

    fn from_code(c: char) -> Option<Self> {
        match c {
            'M' => Some(CigarOp::Match),
            'I' => Some(CigarOp::Ins),
            'D' => Some(CigarOp::Del),
            'N' => Some(CigarOp::RefSkip),
            'S' => Some(CigarOp::SoftClip),
            'H' => Some(CigarOp::HardClip),
            'P' => Some(CigarOp::Pad),
            '=' => Some(CigarOp::Equal),
            'X' => Some(CigarOp::Diff),
            _ => None,
        }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarElem {
    op: CigarOp,
    len: usize,
}

impl CigarElem {
    pub fn new(op: CigarOp, len: usize) -> Self {
        assert!(len > 0, "Zero length cigar element");
        Self { op, len }
    }

    pub fn op(&self) -> CigarOp {
        self.op
    }

    pub fn op_len(&self) -> usize {
        self.len
    }
}

/// Ordered alignment path of a read against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cigar(Vec<CigarElem>);

impl Cigar {
    pub fn new(elems: Vec<CigarElem>) -> Self {
        Self(elems)
    }

    pub fn iter(&self) -> std::slice::Iter<CigarElem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Cigar {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self, SelectError> {
        let err = || SelectError::BadCigar(s.to_owned());

        let mut elems = Vec::new();
        let mut num = String::new();
        for ch in s.chars() {
            if ch.is_ascii_digit() {
                num.push(ch);
            } else {
                let op = CigarOp::from_code(ch).ok_or_else(err)?;
                let l: usize = num.parse().map_err(|_| err())?;
                if l == 0 {
                    return Err(err());
                }
                elems.push(CigarElem::new(op, l));
                num.clear();
            }
        }
        if !num.is_empty() || elems.is_empty() {
            return Err(err());
        }
        Ok(Cigar(elems))
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for elem in self.iter() {
            write!(f, "{}{}", elem.len, elem.op)?;
        }
        Ok(())
    }
}

/// A reference-aligned read as delivered by the caller. Never mutated here.
///
/// `seq` and `qual` run in parallel over the non-hard-clipped bases.
#[derive(Debug, Clone)]
pub struct AlignedRead {
    qname: Box<str>,
    ctg: Box<str>,
    pos: i64,
    mapq: u8,
    cigar: Cigar,
    seq: Vec<u8>,
    qual: Vec<u8>,
}

impl AlignedRead {
    pub fn new(
        qname: &str,
        ctg: &str,
        pos: i64,
        mapq: u8,
        cigar: Cigar,
        seq: Vec<u8>,
        qual: Vec<u8>,
    ) -> Self {
        assert_eq!(seq.len(), qual.len(), "Sequence and quality lengths differ");
        Self {
            qname: Box::from(qname),
            ctg: Box::from(ctg),
            pos,
            mapq,
            cigar,
            seq,
            qual,
        }
    }

    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn ctg(&self) -> &str {
        &self.ctg
    }

    /// Leftmost mapped reference position, zero-based
    pub fn pos(&self) -> i64 {
        self.pos
    }

    pub fn mapq(&self) -> u8 {
        self.mapq
    }

    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }

    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    pub fn qual(&self) -> &[u8] {
        &self.qual
    }
}

use crate::catalog::RawHeader;

/// Per-chunk summary stats within a [`DepHeader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Index of this chunk, `0..chunks.len()`.
    pub chunk: u32,
    /// Number of candidates in this chunk.
    pub n: u32,
    /// Minimum `upload_time` of any candidate in this chunk.
    pub min_t: Option<i64>,
    /// Maximum `upload_time` of any candidate in this chunk.
    pub max_t: Option<i64>,
}

/// The list of [`ChunkInfo`] for one `(src, dep_name)` edge-group, plus
/// overall `min_t`/`max_t`. Absence (`Option<DepHeader>::None`) means "no
/// dependency of this name from this source".
#[derive(Debug, Clone, Default)]
pub struct DepHeader {
    /// Per-chunk stats, in chunk order.
    pub chunks: Vec<ChunkInfo>,
    /// The smallest `min_t` across all chunks.
    pub min_t: Option<i64>,
    /// The largest `max_t` across all chunks.
    pub max_t: Option<i64>,
}

impl DepHeader {
    /// Validates and builds a [`DepHeader`] from the catalog's raw parallel
    /// arrays. Returns `None` if `mi`/`ma`/`n` don't share a length — the
    /// header is then treated as absent rather than fabricated from
    /// inconsistent data (`spec.md` §4.3).
    pub fn from_raw(raw: RawHeader) -> Option<Self> {
        let len = raw.n.len();
        if raw.mi.len() != len || raw.ma.len() != len {
            return None;
        }

        let mut chunks = Vec::with_capacity(len);
        let mut overall_min = None;
        let mut overall_max = None;

        for (idx, ((min_t, max_t), n)) in raw
            .mi
            .into_iter()
            .zip(raw.ma.into_iter())
            .zip(raw.n.into_iter())
            .enumerate()
        {
            chunks.push(ChunkInfo {
                chunk: idx as u32,
                n: n.unwrap_or(0),
                min_t,
                max_t,
            });
            if let Some(mn) = min_t {
                overall_min = Some(overall_min.map_or(mn, |cur: i64| cur.min(mn)));
            }
            if let Some(mx) = max_t {
                overall_max = Some(overall_max.map_or(mx, |cur: i64| cur.max(mx)));
            }
        }

        Some(DepHeader {
            chunks,
            min_t: overall_min,
            max_t: overall_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_lengths_are_absent() {
        let raw = RawHeader {
            mi: vec![Some(1)],
            ma: vec![Some(2), Some(3)],
            n: vec![Some(1)],
        };
        assert!(DepHeader::from_raw(raw).is_none());
    }

    #[test]
    fn consistent_lengths_build_overall_bounds() {
        let raw = RawHeader {
            mi: vec![Some(5), Some(1)],
            ma: vec![Some(10), Some(4)],
            n: vec![Some(2), Some(3)],
        };
        let header = DepHeader::from_raw(raw).unwrap();
        assert_eq!(header.min_t, Some(1));
        assert_eq!(header.max_t, Some(10));
        assert_eq!(header.chunks.len(), 2);
    }
}

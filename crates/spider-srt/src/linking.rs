// SPDX-License-Identifier: Apache-2.0
//! Pure token-accounting arithmetic for step 4 (edge linkage): which slice
//! of which source firing feeds which slice of which sink firing, once both
//! sides have been split down to single-rate firing blocks.
//!
//! A source id of `-1` denotes the delay buffer rather than a real firing
//! of the reference vertex: the first `delay` tokens a sink consumes come
//! from there instead of from firing `0`'s production.

/// For every sink firing `0..r_snk`, the ordered list of `(source_id, rate)`
/// pairs it draws tokens from, ascending by source id. `source_id` is `-1`
/// for the portion fed by a delay, otherwise a real source-firing index.
pub fn compute_producers(r_src: i64, src_rate: i64, r_snk: i64, snk_rate: i64, delay: i64) -> Vec<Vec<(i64, i64)>> {
    let mut producers = Vec::with_capacity(r_snk.max(0) as usize);
    for k in 0..r_snk {
        let start = k * snk_rate - delay;
        let end = (k + 1) * snk_rate - delay;
        let mut entries = Vec::new();

        if start < 0 {
            let buf_end = end.min(0);
            let len = buf_end - start;
            if len > 0 {
                entries.push((-1i64, len));
            }
        }

        if end > 0 && src_rate > 0 {
            let real_start = start.max(0);
            let mut s = real_start / src_rate;
            let mut pos = real_start;
            while pos < end && s < r_src {
                let s_end = (s + 1) * src_rate;
                let seg_end = end.min(s_end);
                let len = seg_end - pos;
                if len > 0 {
                    entries.push((s, len));
                }
                pos = seg_end;
                s += 1;
            }
        }

        producers.push(entries);
    }
    producers
}

/// Inverts [`compute_producers`] into, for every real source firing
/// `0..r_src`, the ordered list of `(sink_id, rate)` pairs it feeds,
/// ascending by sink id. The delay buffer's own consumers are not tracked
/// here; callers treat `-1` producer entries as already satisfied.
pub fn invert_to_consumers(producers: &[Vec<(i64, i64)>], r_src: i64) -> Vec<Vec<(i64, i64)>> {
    let mut consumers = vec![Vec::new(); r_src.max(0) as usize];
    for (k, entries) in producers.iter().enumerate() {
        for &(src, rate) in entries {
            if src >= 0 {
                consumers[src as usize].push((k as i64, rate));
            }
        }
    }
    consumers
}

/// For a source vertex with `delay` outstanding, the ordered list of
/// `(source_id, rate)` pairs contributing to the final `delay` tokens of
/// its total production: the span no sink claims this iteration because it
/// seeds the *next* iteration's leading buffer. Symmetric to the buffer
/// entries [`compute_producers`] attributes to source id `-1`.
pub fn tail_segments(r_src: i64, src_rate: i64, delay: i64) -> Vec<(i64, i64)> {
    let mut entries = Vec::new();
    if delay <= 0 || src_rate <= 0 || r_src <= 0 {
        return entries;
    }
    let total = r_src * src_rate;
    let start = (total - delay).max(0);
    let mut pos = start;
    let mut s = pos / src_rate;
    while pos < total && s < r_src {
        let s_end = (s + 1) * src_rate;
        let seg_end = total.min(s_end);
        let len = seg_end - pos;
        if len > 0 {
            entries.push((s, len));
        }
        pos = seg_end;
        s += 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn one_to_one_same_rate() {
        let producers = compute_producers(3, 2, 3, 2, 0);
        assert_eq!(producers, vec![vec![(0, 2)], vec![(1, 2)], vec![(2, 2)]]);
        let consumers = invert_to_consumers(&producers, 3);
        assert_eq!(consumers, vec![vec![(0, 2)], vec![(1, 2)], vec![(2, 2)]]);
    }

    #[test]
    fn fork_one_source_many_sinks() {
        // One firing producing 6, four sinks each consuming... use rate 2
        // sinks, i.e. r_src=1 rate=6, r_snk=3 rate=2.
        let producers = compute_producers(1, 6, 3, 2, 0);
        assert_eq!(producers, vec![vec![(0, 2)], vec![(0, 2)], vec![(0, 2)]]);
        let consumers = invert_to_consumers(&producers, 1);
        assert_eq!(consumers, vec![vec![(0, 2), (1, 2), (2, 2)]]);
    }

    #[test]
    fn join_many_sources_one_sink() {
        // Three producers of 2 each feed a single sink firing of rate 6.
        let producers = compute_producers(3, 2, 1, 6, 0);
        assert_eq!(producers, vec![vec![(0, 2), (1, 2), (2, 2)]]);
    }

    #[test]
    fn uneven_split_spans_source_boundary() {
        // r_src=2 rate=3 (total 6), r_snk=3 rate=2: sink 0 takes [0,2) from
        // source 0; sink 1 takes [2,4) which straddles source 0's tail
        // ([2,3)) and source 1's head ([3,4)); sink 2 takes [4,6) from
        // source 1.
        let producers = compute_producers(2, 3, 3, 2, 0);
        assert_eq!(producers, vec![vec![(0, 2)], vec![(0, 1), (1, 1)], vec![(1, 2)]]);
    }

    #[test]
    fn delay_feeds_leading_sinks() {
        // delay=2, src_rate=2, snk_rate=2, r_src=2, r_snk=2. Consumption
        // positions: sink0 [-2,0) fully from the buffer; sink1 [0,2) from
        // source firing 0. Source firing 1's production ([2,4)) becomes the
        // next iteration's buffer and is claimed by no sink here.
        let producers = compute_producers(2, 2, 2, 2, 2);
        assert_eq!(producers, vec![vec![(-1, 2)], vec![(0, 2)]]);
    }

    #[test]
    fn delay_straddles_buffer_and_source() {
        // delay=1, src_rate=2, snk_rate=2, r_src=2, r_snk=2. sink0 consumes
        // [-1,1): 1 token from buffer, 1 from source firing 0. sink1
        // consumes [1,3): 1 from source firing 0's tail, 1 from source
        // firing 1's head.
        let producers = compute_producers(2, 2, 2, 2, 1);
        assert_eq!(producers, vec![vec![(-1, 1), (0, 1)], vec![(0, 1), (1, 1)]]);
    }

    #[test]
    fn tail_is_empty_without_delay() {
        assert_eq!(tail_segments(3, 2, 0), Vec::new());
    }

    #[test]
    fn tail_matches_leading_buffer_span() {
        // Mirrors `delay_feeds_leading_sinks`: the buffer's leading span and
        // the tail are both exactly `delay` tokens, at opposite ends.
        assert_eq!(tail_segments(2, 2, 2), vec![(1, 2)]);
    }

    #[test]
    fn tail_straddles_two_source_firings() {
        // Mirrors `delay_straddles_buffer_and_source`: the final token
        // (position 3) is source firing 1's only contribution to the tail.
        assert_eq!(tail_segments(2, 2, 1), vec![(1, 1)]);
    }

    #[test]
    fn tail_spans_an_entire_source_firing_when_delay_is_large() {
        // delay equal to src_rate: the tail is exactly the last firing's
        // whole production.
        assert_eq!(tail_segments(3, 2, 2), vec![(2, 2)]);
    }
}

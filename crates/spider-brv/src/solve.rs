// SPDX-License-Identifier: Apache-2.0
//! Balance-equation solver: assigns every non-interface vertex an integer
//! repetition value consistent with every edge's rate ratio.

use std::collections::{BTreeMap, HashSet, VecDeque};

use spider_model::{Graph, VertexSubtype};
use tracing::instrument;

use crate::error::BrvError;
use crate::rational::{lcm_all, Rational};

struct RateEdge {
    edge_index: usize,
    src: usize,
    snk: usize,
    src_rate: i64,
    snk_rate: i64,
}

/// Solves the repetition vector for every non-interface, non-removed
/// vertex of `graph`, against its current parameter snapshot.
///
/// Configuration actors and the graph's own boundary interfaces are
/// pinned to a relative repetition of exactly `1`; every other vertex's
/// value is derived from the edges connecting it to the rest of its
/// connected component.
#[instrument(skip(graph))]
pub fn solve(graph: &Graph) -> Result<BTreeMap<usize, i64>, BrvError> {
    let values = graph.resolved_values();

    let mut rate_edges = Vec::new();
    for edge in graph.live_edges() {
        if edge.is_self_loop() {
            continue;
        }
        let src_rate = edge.src_rate().evaluate(&values)?;
        let snk_rate = edge.snk_rate().evaluate(&values)?;
        if src_rate < 0.0 || snk_rate < 0.0 {
            return Err(BrvError::NegativeRate { edge: edge.index() });
        }
        let src_rate = src_rate.round() as i64;
        let snk_rate = snk_rate.round() as i64;
        if (src_rate == 0) != (snk_rate == 0) {
            return Err(BrvError::ZeroSeed { edge: edge.index() });
        }
        rate_edges.push(RateEdge {
            edge_index: edge.index(),
            src: edge.src_vertex(),
            snk: edge.snk_vertex(),
            src_rate,
            snk_rate,
        });
    }

    let mut adjacency: BTreeMap<usize, Vec<(usize, Rational)>> = BTreeMap::new();
    for re in &rate_edges {
        if re.src_rate == 0 && re.snk_rate == 0 {
            // Both ends idle on this edge; no ratio information, but the
            // vertices are still linked (e.g. a void/zero-rate edge).
            adjacency.entry(re.src).or_default().push((re.snk, Rational::one()));
            adjacency.entry(re.snk).or_default().push((re.src, Rational::one()));
            continue;
        }
        // r(src) * srcRate = r(snk) * snkRate  =>  r(snk) = r(src) * srcRate/snkRate
        let forward = Rational::new(re.src_rate, re.snk_rate);
        let backward = Rational::new(re.snk_rate, re.src_rate);
        adjacency.entry(re.src).or_default().push((re.snk, forward));
        adjacency.entry(re.snk).or_default().push((re.src, backward));
    }

    let participating: HashSet<usize> = graph
        .vertices()
        .map(|v| v.index())
        .filter(|i| adjacency.contains_key(i))
        .collect();
    let isolated: Vec<usize> = graph
        .vertices()
        .filter(|v| !v.subtype().is_interface() && !participating.contains(&v.index()))
        .map(|v| v.index())
        .collect();

    let pinned = |graph: &Graph, v: usize| -> bool {
        graph
            .vertex(v)
            .map(|vx| vx.subtype() == VertexSubtype::Config || vx.subtype().is_interface())
            .unwrap_or(false)
    };

    let mut result: BTreeMap<usize, i64> = BTreeMap::new();
    let mut visited: HashSet<usize> = HashSet::new();

    for &start in &participating {
        if visited.contains(&start) {
            continue;
        }
        let mut component = Vec::new();
        let mut rel: BTreeMap<usize, Rational> = BTreeMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);
        rel.insert(start, Rational::one());

        while let Some(v) = queue.pop_front() {
            component.push(v);
            let Some(neighbors) = adjacency.get(&v) else {
                continue;
            };
            let current = rel[&v];
            for &(next, ratio) in neighbors {
                let expected = current.mul(ratio);
                if let Some(&existing) = rel.get(&next) {
                    if existing != expected {
                        return Err(BrvError::Inconsistent { component });
                    }
                } else {
                    rel.insert(next, expected);
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }

        let pinned_in_component: Vec<usize> = component.iter().copied().filter(|&v| pinned(graph, v)).collect();

        let scale: Rational = if let Some(&anchor) = pinned_in_component.first() {
            let anchor_rel = rel[&anchor];
            let scale = Rational::one().div(anchor_rel);
            for &other in &pinned_in_component[1..] {
                if rel[&other] != anchor_rel {
                    return Err(BrvError::Inconsistent { component });
                }
            }
            scale
        } else {
            let denominators = component.iter().map(|v| rel[v].denominator());
            Rational::new(lcm_all(denominators), 1)
        };

        let mut scaled: BTreeMap<usize, i64> = BTreeMap::new();
        for &v in &component {
            let final_value = rel[&v].mul(scale);
            if !final_value.is_integer() {
                return Err(BrvError::Inconsistent { component });
            }
            scaled.insert(v, final_value.numerator());
        }

        let common = scaled.values().copied().fold(0i64, gcd_i64);
        let common = common.max(1);
        for (v, value) in scaled {
            if graph.vertex(v).map(|vx| vx.subtype().is_interface()).unwrap_or(true) {
                continue;
            }
            result.insert(v, value / common);
        }
    }

    for v in isolated {
        result.insert(v, 1);
    }

    for actor in graph.config_actors() {
        result.entry(*actor).or_insert(1);
    }

    Ok(result)
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

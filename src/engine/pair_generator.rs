// ==========================================
// Dual Meet APS - pair generator
// ==========================================
// Greedy degree-constrained selection over the eligible edge list
// ==========================================
// Input: available roster + pinned bouts + excluded pairs + settings
// Output: new bouts + rejected pairs (for visibility only)
// ==========================================
// Steps:
// 1. seed pinned (locked/forced) bouts, reserving endpoint capacity
// 2. evaluate every unordered roster pair, keep eligible edges
// 3. sort by (cost, pair key) so identical input yields identical output
// 4. walk once, accept an edge when both endpoints have capacity
// 5. explain wrestlers left with zero bouts
// ==========================================

use crate::domain::bout::{Bout, PairKey, RejectReason, RejectedPair};
use crate::domain::settings::PairingSettings;
use crate::domain::types::BoutType;
use crate::domain::wrestler::Wrestler;
use crate::engine::eligibility::EligibilityEvaluator;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// Eligible edge between two roster wrestlers
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEdge {
    pub pair: PairKey,
    pub cost: f64,
}

/// Input of one generation run
pub struct GenerationInput<'a> {
    pub meet_id: &'a str,
    pub run_id: &'a str,
    /// Active wrestlers not marked ABSENT/NOT_COMING
    pub roster: &'a [Wrestler],
    /// Locked or forced bouts kept across regeneration
    pub pinned: &'a [Bout],
    pub excluded: &'a HashSet<PairKey>,
    pub settings: &'a PairingSettings,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Newly selected bouts in selection order (pinned bouts not included)
    pub bouts: Vec<Bout>,
    pub rejected: Vec<RejectedPair>,
    /// Pinned bouts that were seeded into the selection
    pub seeded_count: usize,
    pub candidate_edge_count: usize,
}

// ==========================================
// PairGenerator
// ==========================================
pub struct PairGenerator {
    // stateless
}

impl Default for PairGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PairGenerator {
    pub fn new() -> Self {
        Self {}
    }

    /// Runs one generation pass
    #[instrument(skip(self, input), fields(
        meet_id = %input.meet_id,
        roster_count = input.roster.len(),
        pinned_count = input.pinned.len()
    ))]
    pub fn generate(&self, input: &GenerationInput<'_>) -> GenerationResult {
        let settings = input.settings;
        let target = settings.target_per_wrestler();

        // Keyed by id; BTreeMap keeps the roster walk in lexical order
        let roster: BTreeMap<&str, &Wrestler> = input
            .roster
            .iter()
            .filter(|w| w.active)
            .map(|w| (w.wrestler_id.as_str(), w))
            .collect();

        let mut remaining: HashMap<&str, u32> = roster.keys().map(|id| (*id, target)).collect();
        let mut bout_count: HashMap<&str, u32> = roster.keys().map(|id| (*id, 0)).collect();
        let mut selected: HashSet<PairKey> = HashSet::new();

        // === step 1: seed pinned bouts ===
        let mut seeded_count = 0;
        for bout in input.pinned {
            let Some(pair) = bout.pair_key() else { continue };
            if !roster.contains_key(pair.low.as_str()) || !roster.contains_key(pair.high.as_str()) {
                continue;
            }
            if !selected.insert(pair.clone()) {
                continue;
            }
            for id in [pair.low.as_str(), pair.high.as_str()] {
                if let Some(left) = remaining.get_mut(id) {
                    *left = left.saturating_sub(1);
                }
                if let Some(count) = bout_count.get_mut(id) {
                    *count += 1;
                }
            }
            seeded_count += 1;
        }

        // === steps 2-3: eligible edges, stable order ===
        let edges = Self::candidate_edges(&roster, settings, input.excluded);
        debug!(edge_count = edges.len(), "candidate edges built");

        // === step 4: greedy walk ===
        let mut bouts = Vec::new();
        for edge in &edges {
            if selected.contains(&edge.pair) {
                continue;
            }
            let low_left = remaining.get(edge.pair.low.as_str()).copied().unwrap_or(0);
            let high_left = remaining.get(edge.pair.high.as_str()).copied().unwrap_or(0);
            if low_left == 0 || high_left == 0 {
                continue;
            }

            for id in [edge.pair.low.as_str(), edge.pair.high.as_str()] {
                if let Some(left) = remaining.get_mut(id) {
                    *left -= 1;
                }
                if let Some(count) = bout_count.get_mut(id) {
                    *count += 1;
                }
            }
            selected.insert(edge.pair.clone());
            bouts.push(Bout::new(input.meet_id, &edge.pair, BoutType::Normal));
        }

        // === step 5: explain unmatched wrestlers ===
        let rejected = if target == 0 {
            Vec::new()
        } else {
            Self::explain_unmatched(input, &roster, &bout_count, &edges)
        };

        tracing::info!(
            created = bouts.len(),
            seeded = seeded_count,
            rejected = rejected.len(),
            "pair generation finished"
        );

        GenerationResult {
            bouts,
            rejected,
            seeded_count,
            candidate_edge_count: edges.len(),
        }
    }

    /// Every eligible unordered pair, sorted by cost then pair key
    pub fn candidate_edges(
        roster: &BTreeMap<&str, &Wrestler>,
        settings: &PairingSettings,
        excluded: &HashSet<PairKey>,
    ) -> Vec<CandidateEdge> {
        let wrestlers: Vec<&Wrestler> = roster.values().copied().collect();
        let mut edges = Vec::new();

        for (i, a) in wrestlers.iter().enumerate() {
            for b in wrestlers.iter().skip(i + 1) {
                let eval = EligibilityEvaluator::evaluate(a, b, settings, excluded);
                if !eval.eligible {
                    continue;
                }
                if let Some(pair) = PairKey::new(&a.wrestler_id, &b.wrestler_id) {
                    edges.push(CandidateEdge {
                        pair,
                        cost: eval.cost,
                    });
                }
            }
        }

        edges.sort_by(|x, y| x.cost.total_cmp(&y.cost).then_with(|| x.pair.cmp(&y.pair)));
        edges
    }

    /// A wrestler with zero bouts gets one RejectedPair:
    /// - against the cheapest eligible partner still below the bout cap,
    ///   else the cheapest eligible partner at all
    /// - otherwise against the closest ineligible wrestler, with the failed check
    fn explain_unmatched(
        input: &GenerationInput<'_>,
        roster: &BTreeMap<&str, &Wrestler>,
        bout_count: &HashMap<&str, u32>,
        edges: &[CandidateEdge],
    ) -> Vec<RejectedPair> {
        let mut rejected = Vec::new();

        for (id, wrestler) in roster {
            if bout_count.get(id).copied().unwrap_or(0) > 0 {
                continue;
            }

            // edges are sorted, so the first hit is the cheapest partner
            let cap = input.settings.max_matches_per_wrestler;
            let cheapest = edges.iter().find(|e| e.pair.contains(id));
            let below_cap = edges.iter().filter(|e| e.pair.contains(id)).find(|e| {
                e.pair
                    .other(id)
                    .map_or(false, |other| bout_count.get(other).copied().unwrap_or(0) < cap)
            });
            if let Some(edge) = below_cap.or(cheapest) {
                rejected.push(RejectedPair {
                    meet_id: input.meet_id.to_string(),
                    pair: edge.pair.clone(),
                    wrestler_id: id.to_string(),
                    reason: RejectReason::PartnersClaimed,
                    run_id: input.run_id.to_string(),
                });
                continue;
            }

            let closest = roster
                .iter()
                .filter(|(other_id, _)| *other_id != id)
                .map(|(other_id, other)| {
                    let eval = EligibilityEvaluator::evaluate(
                        wrestler,
                        other,
                        input.settings,
                        input.excluded,
                    );
                    (*other_id, eval)
                })
                .min_by(|(ida, a), (idb, b)| a.cost.total_cmp(&b.cost).then_with(|| ida.cmp(idb)));

            if let Some((other_id, eval)) = closest {
                if let Some(pair) = PairKey::new(id, other_id) {
                    rejected.push(RejectedPair {
                        meet_id: input.meet_id.to_string(),
                        pair,
                        wrestler_id: id.to_string(),
                        reason: eval.reason.unwrap_or(RejectReason::PartnersClaimed),
                        run_id: input.run_id.to_string(),
                    });
                }
            }
        }

        rejected
    }
}

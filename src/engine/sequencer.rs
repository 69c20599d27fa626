// ==========================================
// Dual Meet APS - rest-aware sequencer
// ==========================================
// Places bouts on mats and orders them to keep wrestlers rested
// ==========================================
// Penalty model (soft, never blocks a placement):
//   for each wrestler, for each pair of their bouts on the same mat,
//   gap = bouts on that mat strictly between the two
//   if gap < min_rest_bouts: cost += rest_penalty * (min_rest_bouts - gap)
// ==========================================
// assign:  locked anchors first, then each free bout goes to the best of
//          {preferred mat, two least-loaded other mats} by
//          rest cost + (mat load - mean load); then each mat is resequenced
// reorder: mats are kept, only the order within each mat is recomputed;
//          a mat keeps its current order unless the new one is strictly cheaper
// ==========================================

use crate::domain::bout::Bout;
use crate::domain::settings::MatSettings;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

/// Weight of the load-balance term relative to the rest penalty
pub const LOAD_BALANCE_WEIGHT: f64 = 1.0;

/// Least-loaded mats considered besides the preferred one
pub const NEIGHBOR_WINDOW: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem {
    pub bout_id: String,
    pub red_id: String,
    pub green_id: String,
    /// Resolver preference for assign, current mat for reorder
    pub preferred_mat: u32,
    /// (mat, order) kept unchanged; set for locked bouts
    pub anchor: Option<(u32, u32)>,
    /// Position before this pass, if the bout was scheduled
    pub current: Option<(u32, u32)>,
    /// Stay on `preferred_mat`; only the order is computed
    pub fixed_mat: bool,
}

impl SequenceItem {
    pub fn from_bout(bout: &Bout, preferred_mat: u32) -> Self {
        Self {
            bout_id: bout.bout_id.clone(),
            red_id: bout.red_id.clone(),
            green_id: bout.green_id.clone(),
            preferred_mat,
            anchor: if bout.locked { Some((bout.mat, bout.order)) } else { None },
            current: if bout.order >= 1 { Some((bout.mat, bout.order)) } else { None },
            fixed_mat: false,
        }
    }

    pub fn with_fixed_mat(mut self) -> Self {
        self.fixed_mat = true;
        self
    }

    fn wrestlers(&self) -> [&str; 2] {
        [self.red_id.as_str(), self.green_id.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub bout_id: String,
    pub mat: u32,
    pub order: u32,
}

// ==========================================
// Board - per-mat occupancy during one pass
// ==========================================
#[derive(Clone)]
struct Board {
    /// order -> item index, per mat
    mats: Vec<BTreeMap<u32, usize>>,
    /// wrestler -> orders they occupy, per mat
    appearances: Vec<HashMap<String, BTreeSet<u32>>>,
}

impl Board {
    fn new(num_mats: usize) -> Self {
        Self {
            mats: vec![BTreeMap::new(); num_mats],
            appearances: vec![HashMap::new(); num_mats],
        }
    }

    fn num_mats(&self) -> usize {
        self.mats.len()
    }

    fn load(&self, mat: usize) -> usize {
        self.mats[mat].len()
    }

    fn total(&self) -> usize {
        self.mats.iter().map(|m| m.len()).sum()
    }

    fn is_free(&self, mat: usize, order: u32) -> bool {
        !self.mats[mat].contains_key(&order)
    }

    /// Lowest 1-based order not taken on the mat
    fn next_free_order(&self, mat: usize) -> u32 {
        let mut order = 1;
        while !self.is_free(mat, order) {
            order += 1;
        }
        order
    }

    fn place(&mut self, mat: usize, order: u32, idx: usize, item: &SequenceItem) {
        self.mats[mat].insert(order, idx);
        for w in item.wrestlers() {
            self.appearances[mat].entry(w.to_string()).or_default().insert(order);
        }
    }

    /// Bouts on the mat strictly between two orders
    fn gap(&self, mat: usize, a: u32, b: u32) -> u32 {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        if hi <= lo + 1 {
            return 0;
        }
        self.mats[mat].range(lo + 1..hi).count() as u32
    }

    /// Rest penalty added by putting the item at (mat, order)
    fn rest_cost(&self, mat: usize, order: u32, item: &SequenceItem, min_rest: u32, penalty: f64) -> f64 {
        let mut cost = 0.0;
        for w in item.wrestlers() {
            let Some(orders) = self.appearances[mat].get(w) else { continue };
            for &other in orders {
                if other == order {
                    continue;
                }
                let gap = self.gap(mat, order, other);
                if gap < min_rest {
                    cost += penalty * (min_rest - gap) as f64;
                }
            }
        }
        cost
    }

    /// Rest penalty of everything currently placed on the mat
    fn mat_penalty(&self, mat: usize, min_rest: u32, penalty: f64) -> f64 {
        let mut total = 0.0;
        for orders in self.appearances[mat].values() {
            for (i, &a) in orders.iter().enumerate() {
                for &b in orders.iter().skip(i + 1) {
                    let gap = self.gap(mat, a, b);
                    if gap < min_rest {
                        total += penalty * (min_rest - gap) as f64;
                    }
                }
            }
        }
        total
    }

    fn placements(&self, items: &[SequenceItem]) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.total());
        for (mat, slots) in self.mats.iter().enumerate() {
            for (&order, &idx) in slots {
                out.push(Placement {
                    bout_id: items[idx].bout_id.clone(),
                    mat: mat as u32,
                    order,
                });
            }
        }
        out
    }
}

// ==========================================
// RestAwareSequencer
// ==========================================
pub struct RestAwareSequencer {
    settings: MatSettings,
}

impl RestAwareSequencer {
    pub fn new(settings: MatSettings) -> Self {
        Self { settings }
    }

    fn mat_count(&self) -> usize {
        self.settings.num_mats.max(1) as usize
    }

    fn clamp_mat(&self, mat: u32) -> usize {
        (mat as usize).min(self.mat_count() - 1)
    }

    /// Places anchors; returns indices of the items still to be placed
    fn seed_anchors(&self, board: &mut Board, items: &[SequenceItem]) -> Vec<usize> {
        let mut free = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match item.anchor {
                Some((mat, order))
                    if (mat as usize) < board.num_mats() && order >= 1 && board.is_free(mat as usize, order) =>
                {
                    board.place(mat as usize, order, idx, item);
                }
                Some((mat, order)) => {
                    warn!(bout_id = %item.bout_id, mat, order, "anchor slot unusable, bout rescheduled");
                    free.push(idx);
                }
                None => free.push(idx),
            }
        }
        free
    }

    /// Assigns mat and order to every item
    #[instrument(skip(self, items), fields(bout_count = items.len(), num_mats = self.settings.num_mats))]
    pub fn assign(&self, items: &[SequenceItem]) -> Vec<Placement> {
        let mut board = Board::new(self.mat_count());
        let free = self.seed_anchors(&mut board, items);

        let mut mat_of: HashMap<usize, usize> = HashMap::new();
        for &idx in &free {
            let item = &items[idx];
            let preferred = self.clamp_mat(item.preferred_mat);
            if item.fixed_mat {
                let order = board.next_free_order(preferred);
                board.place(preferred, order, idx, item);
                mat_of.insert(idx, preferred);
                continue;
            }
            let mean = board.total() as f64 / board.num_mats() as f64;

            let mut best: Option<(f64, usize)> = None;
            for mat in self.candidate_window(&board, preferred) {
                let order = board.next_free_order(mat);
                let rest = board.rest_cost(mat, order, item, self.settings.min_rest_bouts, self.settings.rest_penalty);
                let balance = LOAD_BALANCE_WEIGHT * (board.load(mat) as f64 - mean);
                let score = rest + balance;
                // window lists the preferred mat first, strict < keeps it on ties
                if best.map_or(true, |(s, _)| score < s) {
                    best = Some((score, mat));
                }
            }

            let mat = best.map(|(_, m)| m).unwrap_or(preferred);
            let order = board.next_free_order(mat);
            board.place(mat, order, idx, item);
            mat_of.insert(idx, mat);
        }

        debug!(placed = free.len(), "mat placement pass finished");

        // second pass: order within each mat
        let resequenced: Vec<SequenceItem> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let mut item = item.clone();
                if let Some(&mat) = mat_of.get(&idx) {
                    item.preferred_mat = mat as u32;
                    item.anchor = None;
                }
                item
            })
            .collect();
        self.reorder(&resequenced)
    }

    /// Preferred mat followed by the least-loaded other mats
    fn candidate_window(&self, board: &Board, preferred: usize) -> Vec<usize> {
        let mut others: Vec<usize> = (0..board.num_mats()).filter(|&m| m != preferred).collect();
        others.sort_by_key(|&m| (board.load(m), m));
        let mut window = vec![preferred];
        window.extend(others.into_iter().take(NEIGHBOR_WINDOW));
        window
    }

    /// Keeps every item on its current mat and recomputes order only
    #[instrument(skip(self, items), fields(bout_count = items.len()))]
    pub fn reorder(&self, items: &[SequenceItem]) -> Vec<Placement> {
        let mut board = Board::new(self.mat_count());
        let free = self.seed_anchors(&mut board, items);

        // pending items per mat, in input order
        let mut pending: Vec<Vec<usize>> = vec![Vec::new(); board.num_mats()];
        for idx in free {
            let mat = self.clamp_mat(items[idx].preferred_mat);
            pending[mat].push(idx);
        }

        let (min_rest, penalty) = (self.settings.min_rest_bouts, self.settings.rest_penalty);
        for (mat, queue) in pending.into_iter().enumerate() {
            if queue.is_empty() {
                continue;
            }

            let mut greedy = board.clone();
            self.fill_greedy(&mut greedy, mat, queue.clone(), items);

            // current order on this mat; bouts arriving from another mat go last
            let mut current = queue;
            current.sort_by_key(|&idx| match items[idx].current {
                Some((m, order)) if m as usize == mat => (0, order, idx),
                _ => (1, 0, idx),
            });
            let mut kept = board.clone();
            for idx in current {
                let order = kept.next_free_order(mat);
                kept.place(mat, order, idx, &items[idx]);
            }

            let greedy_cost = greedy.mat_penalty(mat, min_rest, penalty);
            let kept_cost = kept.mat_penalty(mat, min_rest, penalty);
            board = if greedy_cost < kept_cost {
                greedy
            } else {
                debug!(mat, kept_cost, greedy_cost, "current order kept");
                kept
            };
        }

        board.placements(items)
    }

    /// Fills the mat slot by slot with the pending bout of least rest cost
    fn fill_greedy(&self, board: &mut Board, mat: usize, mut queue: Vec<usize>, items: &[SequenceItem]) {
        while !queue.is_empty() {
            let order = board.next_free_order(mat);
            let mut best_pos = 0;
            let mut best_cost = f64::INFINITY;
            for (pos, &idx) in queue.iter().enumerate() {
                let cost = board.rest_cost(mat, order, &items[idx], self.settings.min_rest_bouts, self.settings.rest_penalty);
                if cost < best_cost {
                    best_cost = cost;
                    best_pos = pos;
                }
            }
            let idx = queue.remove(best_pos);
            board.place(mat, order, idx, &items[idx]);
        }
    }
}

// ==========================================
// Penalty evaluation over a finished schedule
// ==========================================

/// Total rest penalty of a set of scheduled bouts
///
/// The gap between two bouts of a wrestler is the number of bouts on the
/// same mat with an order strictly between theirs.
pub fn total_rest_penalty(bouts: &[Bout], min_rest_bouts: u32, rest_penalty: f64) -> f64 {
    let mut by_mat: HashMap<u32, BTreeSet<u32>> = HashMap::new();
    let mut by_wrestler: HashMap<(&str, u32), Vec<u32>> = HashMap::new();
    for bout in bouts {
        by_mat.entry(bout.mat).or_default().insert(bout.order);
        by_wrestler.entry((bout.red_id.as_str(), bout.mat)).or_default().push(bout.order);
        by_wrestler.entry((bout.green_id.as_str(), bout.mat)).or_default().push(bout.order);
    }

    let mut total = 0.0;
    for ((_, mat), orders) in by_wrestler {
        let Some(occupied) = by_mat.get(&mat) else { continue };
        for (i, &a) in orders.iter().enumerate() {
            for &b in orders.iter().skip(i + 1) {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                let gap = if hi <= lo + 1 { 0 } else { occupied.range(lo + 1..hi).count() as u32 };
                if gap < min_rest_bouts {
                    total += rest_penalty * (min_rest_bouts - gap) as f64;
                }
            }
        }
    }
    total
}

/// Bout count per mat index in [0, num_mats)
pub fn mat_loads(bouts: &[Bout], num_mats: u32) -> Vec<usize> {
    let mut loads = vec![0; num_mats.max(1) as usize];
    for bout in bouts {
        if let Some(slot) = loads.get_mut(bout.mat as usize) {
            *slot += 1;
        }
    }
    loads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bout::PairKey;
    use crate::domain::types::BoutType;

    fn item(id: &str, red: &str, green: &str, preferred: u32) -> SequenceItem {
        SequenceItem {
            bout_id: id.to_string(),
            red_id: red.to_string(),
            green_id: green.to_string(),
            preferred_mat: preferred,
            anchor: None,
            current: None,
            fixed_mat: false,
        }
    }

    /// Item already scheduled at (mat, order)
    fn placed(id: &str, red: &str, green: &str, mat: u32, order: u32) -> SequenceItem {
        let mut it = item(id, red, green, mat);
        it.current = Some((mat, order));
        it
    }

    fn current_placements(items: &[SequenceItem]) -> Vec<Placement> {
        items
            .iter()
            .filter_map(|it| {
                it.current.map(|(mat, order)| Placement { bout_id: it.bout_id.clone(), mat, order })
            })
            .collect()
    }

    fn settings(num_mats: u32, min_rest: u32) -> MatSettings {
        MatSettings {
            num_mats,
            min_rest_bouts: min_rest,
            rest_penalty: 10.0,
        }
    }

    fn to_bouts(items: &[SequenceItem], placements: &[Placement]) -> Vec<Bout> {
        placements
            .iter()
            .map(|p| {
                let item = items.iter().find(|i| i.bout_id == p.bout_id).unwrap();
                let mut bout = Bout::new("m1", &PairKey::new(&item.red_id, &item.green_id).unwrap(), BoutType::Normal);
                bout.bout_id = p.bout_id.clone();
                bout.mat = p.mat;
                bout.order = p.order;
                bout
            })
            .collect()
    }

    #[test]
    fn test_assign_places_every_bout_once() {
        let items: Vec<SequenceItem> = (0..9)
            .map(|i| item(&format!("b{}", i), &format!("r{}", i), &format!("g{}", i), 0))
            .collect();
        let placements = RestAwareSequencer::new(settings(3, 2)).assign(&items);

        assert_eq!(placements.len(), 9);
        let loads = mat_loads(&to_bouts(&items, &placements), 3);
        // load balance spreads bouts that all prefer mat 0
        assert_eq!(loads, vec![3, 3, 3]);

        for mat in 0..3 {
            let mut orders: Vec<u32> = placements.iter().filter(|p| p.mat == mat).map(|p| p.order).collect();
            orders.sort();
            assert_eq!(orders, (1..=orders.len() as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_single_mat_reorder_separates_repeat_wrestler() {
        // "x" wrestles in b0 and b1; back to back is penalized
        let items = vec![
            item("b0", "x", "a", 0),
            item("b1", "x", "b", 0),
            item("b2", "c", "d", 0),
            item("b3", "e", "f", 0),
        ];
        let s = settings(1, 2);
        let naive: Vec<Placement> = items
            .iter()
            .enumerate()
            .map(|(i, it)| Placement { bout_id: it.bout_id.clone(), mat: 0, order: i as u32 + 1 })
            .collect();
        let placements = RestAwareSequencer::new(s.clone()).reorder(&items);

        let before = total_rest_penalty(&to_bouts(&items, &naive), s.min_rest_bouts, s.rest_penalty);
        let after = total_rest_penalty(&to_bouts(&items, &placements), s.min_rest_bouts, s.rest_penalty);
        assert!(before > 0.0);
        assert_eq!(after, 0.0);
    }

    #[test]
    fn test_reorder_never_raises_penalty() {
        // greedy slot filling alone scores 120 here against 110 for the input order
        let pairs = [("w5", "w1"), ("w4", "w0"), ("w1", "w2"), ("w2", "w3"), ("w1", "w0"), ("w4", "w2")];
        let items: Vec<SequenceItem> = pairs
            .iter()
            .enumerate()
            .map(|(i, (r, g))| placed(&format!("b{}", i), r, g, 0, i as u32 + 1))
            .collect();
        let s = settings(1, 3);

        let before = total_rest_penalty(&to_bouts(&items, &current_placements(&items)), s.min_rest_bouts, s.rest_penalty);
        let placements = RestAwareSequencer::new(s.clone()).reorder(&items);
        let after = total_rest_penalty(&to_bouts(&items, &placements), s.min_rest_bouts, s.rest_penalty);

        assert_eq!(before, 110.0);
        assert!(after <= before, "before={} after={}", before, after);
        let mut orders: Vec<u32> = placements.iter().map(|p| p.order).collect();
        orders.sort();
        assert_eq!(orders, (1..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_fixed_mat_is_not_rebalanced() {
        // every bout prefers mat 0; fixed ones must stay there
        let items: Vec<SequenceItem> = (0..6)
            .map(|i| item(&format!("b{}", i), &format!("r{}", i), &format!("g{}", i), 0).with_fixed_mat())
            .collect();
        let placements = RestAwareSequencer::new(settings(3, 2)).assign(&items);

        assert_eq!(placements.len(), 6);
        assert!(placements.iter().all(|p| p.mat == 0));
    }

    #[test]
    fn test_reorder_keeps_mats() {
        let items = vec![item("b0", "a", "b", 1), item("b1", "c", "d", 0), item("b2", "a", "e", 1)];
        let placements = RestAwareSequencer::new(settings(2, 1)).reorder(&items);
        for p in &placements {
            let it = items.iter().find(|i| i.bout_id == p.bout_id).unwrap();
            assert_eq!(p.mat, it.preferred_mat);
        }
    }

    #[test]
    fn test_locked_anchor_keeps_mat_and_order() {
        let mut anchored = item("locked", "a", "b", 0);
        anchored.anchor = Some((1, 2));
        let items = vec![item("b0", "c", "d", 1), anchored, item("b1", "e", "f", 1), item("b2", "g", "h", 1)];

        let s = settings(2, 1);
        for placements in [
            RestAwareSequencer::new(s.clone()).assign(&items),
            RestAwareSequencer::new(s.clone()).reorder(&items),
        ] {
            let locked = placements.iter().find(|p| p.bout_id == "locked").unwrap();
            assert_eq!((locked.mat, locked.order), (1, 2));
            let mut seen = BTreeSet::new();
            for p in &placements {
                assert!(seen.insert((p.mat, p.order)), "slot used twice");
            }
        }
    }

    #[test]
    fn test_unusable_anchor_is_rescheduled() {
        let mut anchored = item("locked", "a", "b", 0);
        anchored.anchor = Some((7, 1));
        let placements = RestAwareSequencer::new(settings(2, 1)).assign(&[anchored]);
        assert_eq!(placements.len(), 1);
        assert!(placements[0].mat < 2);
    }

    #[test]
    fn test_penalty_monotone_in_min_rest() {
        let items = vec![
            item("b0", "x", "a", 0),
            item("b1", "x", "b", 0),
            item("b2", "c", "x", 0),
            item("b3", "a", "b", 0),
        ];
        let naive: Vec<Placement> = items
            .iter()
            .enumerate()
            .map(|(i, it)| Placement { bout_id: it.bout_id.clone(), mat: 0, order: i as u32 + 1 })
            .collect();
        let bouts = to_bouts(&items, &naive);

        let mut last = 0.0;
        for min_rest in 0..6 {
            let penalty = total_rest_penalty(&bouts, min_rest, 10.0);
            assert!(penalty >= last);
            last = penalty;
        }
        assert_eq!(total_rest_penalty(&bouts, 0, 10.0), 0.0);
    }

    #[test]
    fn test_penalty_ignores_other_mats() {
        let items = vec![item("b0", "x", "a", 0), item("b1", "x", "b", 1)];
        let placements = vec![
            Placement { bout_id: "b0".to_string(), mat: 0, order: 1 },
            Placement { bout_id: "b1".to_string(), mat: 1, order: 1 },
        ];
        assert_eq!(total_rest_penalty(&to_bouts(&items, &placements), 3, 10.0), 0.0);
    }

    #[test]
    fn test_assign_is_deterministic() {
        let items: Vec<SequenceItem> = (0..20)
            .map(|i| item(&format!("b{:02}", i), &format!("w{}", i % 7), &format!("w{}", (i * 3 + 1) % 11 + 7), (i % 4) as u32))
            .collect();
        let s = settings(3, 3);
        let first = RestAwareSequencer::new(s.clone()).assign(&items);
        let second = RestAwareSequencer::new(s).assign(&items);
        assert_eq!(first, second);
    }
}

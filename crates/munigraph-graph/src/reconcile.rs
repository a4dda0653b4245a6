//! Gap filling across district/canton reassignments.
//!
//! A reassignment closes one interval of a commune and opens the next without any
//! change to the commune itself. Rows that end in the closed interval are extended up
//! to the end of the reopened one, rows that start in the reopened interval are pulled
//! back to the start of the closed one, and the reassignment rows are dropped.
//! Consecutive reassignments collapse transitively.

use munigraph_core::{ClassifiedEvent, CommuneInterval, EventKind, IntervalId, MuniGraphError, Result};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Intervals joined by reassignments, with the combined span of every class.
#[derive(Default)]
struct ReassignmentClasses {
    index: FxHashMap<IntervalId, usize>,
    parent: Vec<usize>,
    admission: Vec<i32>,
    abolition: Vec<i32>,
    /// Interval appears as the closed side of some reassignment
    closed: Vec<bool>,
    /// Interval appears as the reopened side of some reassignment
    reopened: Vec<bool>,
}

impl ReassignmentClasses {
    fn insert(&mut self, interval: &CommuneInterval) -> usize {
        if let Some(&idx) = self.index.get(&interval.id()) {
            return idx;
        }
        let idx = self.parent.len();
        self.index.insert(interval.id(), idx);
        self.parent.push(idx);
        self.admission.push(interval.admission);
        self.abolition.push(interval.abolition);
        self.closed.push(false);
        self.reopened.push(false);
        idx
    }

    fn find(&mut self, mut idx: usize) -> usize {
        while self.parent[idx] != idx {
            let grandparent = self.parent[self.parent[idx]];
            self.parent[idx] = grandparent;
            idx = grandparent;
        }
        idx
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        self.parent[rb] = ra;
        self.admission[ra] = self.admission[ra].min(self.admission[rb]);
        self.abolition[ra] = self.abolition[ra].max(self.abolition[rb]);
    }

    fn add(&mut self, event: &ClassifiedEvent) {
        let closed = self.insert(&event.parent);
        let reopened = self.insert(&event.child);
        self.closed[closed] = true;
        self.reopened[reopened] = true;
        self.union(closed, reopened);
    }

    /// Abolition year to use for an interval that ends where a reassignment starts.
    fn extended_abolition(&mut self, id: &IntervalId) -> Option<i32> {
        let idx = *self.index.get(id)?;
        if !self.closed[idx] {
            return None;
        }
        let root = self.find(idx);
        Some(self.abolition[root])
    }

    /// Admission year to use for an interval that starts where a reassignment ends.
    fn retracted_admission(&mut self, id: &IntervalId) -> Option<i32> {
        let idx = *self.index.get(id)?;
        if !self.reopened[idx] {
            return None;
        }
        let root = self.find(idx);
        Some(self.admission[root])
    }
}

/// Propagates reassignment bounds to neighbouring rows, drops the reassignment rows
/// and validates every remaining interval.
pub fn reconcile(events: Vec<ClassifiedEvent>) -> Result<Vec<ClassifiedEvent>> {
    let mut classes = ReassignmentClasses::default();
    for event in events
        .iter()
        .filter(|e| e.kind == EventKind::DistrictReassignment)
    {
        classes.add(event);
    }

    let total = events.len();
    let mut retained = Vec::with_capacity(total);
    for mut event in events {
        if event.kind == EventKind::DistrictReassignment {
            continue;
        }

        // Both lookups use the identities from before any adjustment.
        let child_id = event.child.id();
        let parent_id = event.parent.id();

        if let Some(abolition) = classes.extended_abolition(&child_id) {
            debug!(child = %child_id, abolition, "extending child across reassignment");
            event.child.abolition = abolition;
        }
        if let Some(admission) = classes.retracted_admission(&parent_id) {
            debug!(parent = %parent_id, admission, "retracting parent across reassignment");
            event.parent.admission = admission;
        }

        validate_interval(&event.parent)?;
        validate_interval(&event.child)?;
        retained.push(event);
    }

    info!(
        retained = retained.len(),
        dropped = total - retained.len(),
        "reconciled district reassignments"
    );
    Ok(retained)
}

fn validate_interval(interval: &CommuneInterval) -> Result<()> {
    if interval.is_well_formed() {
        Ok(())
    } else {
        Err(MuniGraphError::MalformedInterval {
            name: interval.name.clone(),
            admission: interval.admission,
            abolition: interval.abolition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(parent: (&str, i32, i32), child: (&str, i32, i32), kind: EventKind) -> ClassifiedEvent {
        ClassifiedEvent {
            parent: CommuneInterval::new(parent.0, parent.1, parent.2),
            child: CommuneInterval::new(child.0, child.1, child.2),
            date: NaiveDate::from_ymd_opt(parent.2, 1, 1).unwrap(),
            kind,
        }
    }

    #[test]
    fn reassignment_joins_predecessor_and_successor() {
        let events = vec![
            event(("X", 1850, 1900), ("A", 1900, 1950), EventKind::Formed),
            event(("A", 1900, 1950), ("A", 1950, 1950), EventKind::DistrictReassignment),
            event(("A", 1950, 1950), ("B", 1950, 2023), EventKind::Renamed),
        ];
        let retained = reconcile(events).unwrap();
        assert_eq!(retained.len(), 2);
        assert!(retained
            .iter()
            .all(|e| e.kind != EventKind::DistrictReassignment));
        assert_eq!(retained[0].child, CommuneInterval::new("A", 1900, 1950));
        assert_eq!(retained[1].parent, CommuneInterval::new("A", 1900, 1950));
        assert_eq!(retained[0].child.id(), retained[1].parent.id());
    }

    #[test]
    fn neighbours_take_the_reassignment_years() {
        let events = vec![
            event(("X", 1800, 1900), ("A", 1900, 1950), EventKind::Reshaped),
            event(("A", 1900, 1950), ("A", 1950, 1990), EventKind::DistrictReassignment),
            event(("A", 1950, 1990), ("B", 1990, 2023), EventKind::Renamed),
        ];
        let retained = reconcile(events).unwrap();
        assert_eq!(retained[0].child.abolition, 1990);
        assert_eq!(retained[1].parent.admission, 1900);
        assert_eq!(retained[0].child.id().as_str(), "A (1900-1990)");
        assert_eq!(retained[1].parent.id().as_str(), "A (1900-1990)");
    }

    #[test]
    fn missing_neighbours_are_a_no_op() {
        let events = vec![
            event(("A", 1900, 1950), ("A", 1950, 1990), EventKind::DistrictReassignment),
            event(("C", 1900, 1960), ("D", 1960, 2023), EventKind::Renamed),
        ];
        let retained = reconcile(events).unwrap();
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].parent, CommuneInterval::new("C", 1900, 1960));
        assert_eq!(retained[0].child, CommuneInterval::new("D", 1960, 2023));
    }

    #[test]
    fn consecutive_reassignments_collapse() {
        let events = vec![
            event(("X", 1800, 1900), ("A", 1900, 1950), EventKind::Formed),
            event(("A", 1900, 1950), ("A", 1950, 1960), EventKind::DistrictReassignment),
            event(("A", 1950, 1960), ("A", 1960, 1970), EventKind::DistrictReassignment),
            event(("A", 1960, 1970), ("B", 1970, 2023), EventKind::Renamed),
        ];
        let retained = reconcile(events).unwrap();
        assert_eq!(retained.len(), 2);
        assert_eq!(retained[0].child, CommuneInterval::new("A", 1900, 1970));
        assert_eq!(retained[1].parent, CommuneInterval::new("A", 1900, 1970));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let events = vec![event(("A", 1950, 1900), ("B", 1900, 2023), EventKind::Renamed)];
        match reconcile(events) {
            Err(MuniGraphError::MalformedInterval {
                name,
                admission,
                abolition,
            }) => {
                assert_eq!(name, "A");
                assert_eq!((admission, abolition), (1950, 1900));
            }
            other => panic!("expected MalformedInterval, got {:?}", other),
        }
    }
}

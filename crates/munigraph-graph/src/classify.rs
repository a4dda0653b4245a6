//! Mapping from upstream eCH-0071 mode labels to [`EventKind`].

use munigraph_core::{BuildContext, ClassifiedEvent, EventKind, EventRecord, MuniGraphError, Result};
use tracing::debug;

pub const DISTRICT_REASSIGNMENT: &str = "Neue Bezirks-/Kantonszuteilung";
pub const DISSOLUTION: &str = "Aufhebung Gemeinde/Bezirk";
pub const NEW_FOUNDATION: &str = "Neugründung Gemeinde/Bezirk";
pub const AREA_CHANGE: &str = "Gebietsänderung Gemeinde";
pub const NAME_CHANGE: &str = "Namensänderung Gemeinde";

/// The complete (abolition label, admission label) taxonomy.
pub const CLASSIFICATION_TABLE: [(&str, &str, EventKind); 6] = [
    (
        DISTRICT_REASSIGNMENT,
        DISTRICT_REASSIGNMENT,
        EventKind::DistrictReassignment,
    ),
    // several communes merge into a new one
    (DISSOLUTION, NEW_FOUNDATION, EventKind::Formed),
    // a commune is absorbed by an existing one
    (DISSOLUTION, AREA_CHANGE, EventKind::MergedTo),
    (AREA_CHANGE, AREA_CHANGE, EventKind::Reshaped),
    (NAME_CHANGE, NAME_CHANGE, EventKind::Renamed),
    // a new commune is split out of an existing one
    (AREA_CHANGE, NEW_FOUNDATION, EventKind::SplitTo),
];

pub fn classify(abolition_label: &str, admission_label: &str) -> Result<EventKind> {
    CLASSIFICATION_TABLE
        .iter()
        .find(|(abolition, admission, _)| *abolition == abolition_label && *admission == admission_label)
        .map(|(_, _, kind)| *kind)
        .ok_or_else(|| MuniGraphError::UnknownEventKind {
            abolition: abolition_label.to_string(),
            admission: admission_label.to_string(),
        })
}

/// Classifies a raw row and closes an open child interval at the context's sentinel.
pub fn classify_record(record: &EventRecord, ctx: &BuildContext) -> Result<ClassifiedEvent> {
    let kind = classify(&record.abolition_label, &record.admission_label)?;
    let event = ClassifiedEvent {
        parent: record.parent_interval(),
        child: record.child_interval(ctx.active_until),
        date: record.event_date,
        kind,
    };
    debug!(
        parent = %event.parent.id(),
        child = %event.child.id(),
        kind = %kind,
        "classified event"
    );
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn every_table_pair_maps_to_its_kind() {
        let expected = [
            (DISTRICT_REASSIGNMENT, DISTRICT_REASSIGNMENT, EventKind::DistrictReassignment),
            (DISSOLUTION, NEW_FOUNDATION, EventKind::Formed),
            (DISSOLUTION, AREA_CHANGE, EventKind::MergedTo),
            (AREA_CHANGE, AREA_CHANGE, EventKind::Reshaped),
            (NAME_CHANGE, NAME_CHANGE, EventKind::Renamed),
            (AREA_CHANGE, NEW_FOUNDATION, EventKind::SplitTo),
        ];
        for (abolition, admission, kind) in expected {
            assert_eq!(classify(abolition, admission).unwrap(), kind);
        }
    }

    #[test]
    fn unlisted_pairs_are_errors() {
        let labels = [
            DISTRICT_REASSIGNMENT,
            DISSOLUTION,
            NEW_FOUNDATION,
            AREA_CHANGE,
            NAME_CHANGE,
        ];
        let mut unknown = 0;
        for abolition in labels {
            for admission in labels {
                let listed = CLASSIFICATION_TABLE
                    .iter()
                    .any(|(a, b, _)| *a == abolition && *b == admission);
                let result = classify(abolition, admission);
                assert_eq!(result.is_ok(), listed, "{abolition} / {admission}");
                if !listed {
                    unknown += 1;
                    assert!(matches!(
                        result,
                        Err(MuniGraphError::UnknownEventKind { .. })
                    ));
                }
            }
        }
        assert_eq!(unknown, 25 - 6);
    }

    #[test]
    fn matching_is_exact() {
        assert!(classify("gebietsänderung gemeinde", AREA_CHANGE).is_err());
        assert!(classify("", "").is_err());
    }

    #[test]
    fn open_child_is_closed_at_sentinel() {
        let record = EventRecord {
            parent_name: "Olten".into(),
            parent_admission: 1850,
            parent_abolition: 1900,
            child_name: "NeuOlten".into(),
            child_admission: 1900,
            child_abolition: None,
            event_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
            abolition_label: AREA_CHANGE.into(),
            admission_label: AREA_CHANGE.into(),
        };
        let event = classify_record(&record, &BuildContext::new(2023)).unwrap();
        assert_eq!(event.kind, EventKind::Reshaped);
        assert_eq!(event.child.abolition, 2023);
        assert_eq!(event.year(), 1900);
    }
}

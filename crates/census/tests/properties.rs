use std::collections::HashSet;

use proptest::prelude::*;

use plantnet_census::{
    reconcile, CensusPolicy, Discrepancy, DiscrepancyKind, EquipmentTag, RegisteredTag,
    UnregisteredScope,
};

/// Small alphabets so scans and registrations collide often.
fn tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", " AAA", "GGG "])
        .prop_map(str::to_string)
}

fn equipment() -> impl Strategy<Value = Vec<EquipmentTag>> {
    prop::collection::vec(prop::option::of(tag()), 0..8).prop_map(|tags| {
        tags.into_iter()
            .enumerate()
            .map(|(i, t)| EquipmentTag {
                equipo_id: format!("E{i}"),
                rfid_tag_id: t,
            })
            .collect()
    })
}

fn scan() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(tag(), 0..16)
}

fn scope() -> impl Strategy<Value = UnregisteredScope> {
    prop_oneof![Just(UnregisteredScope::Location), Just(UnregisteredScope::Organization)]
}

fn org_index() -> impl Strategy<Value = Vec<RegisteredTag>> {
    prop::collection::vec(tag(), 0..4).prop_map(|tags| {
        tags.into_iter()
            .enumerate()
            .map(|(i, t)| RegisteredTag {
                rfid_tag_id: t,
                equipo_id: format!("X{i}"),
                ubicacion_id: "L2".into(),
            })
            .collect()
    })
}

fn policy(unregistered_scope: UnregisteredScope) -> CensusPolicy {
    CensusPolicy {
        unregistered_scope,
        ..CensusPolicy::default()
    }
}

fn scanned_set(scan: &[String]) -> HashSet<String> {
    scan.iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

proptest! {
    #[test]
    fn counts_match_discrepancies(expected in equipment(), scan in scan(), index in org_index(), s in scope()) {
        let report = reconcile("L1", &expected, &scan, &index, &policy(s)).unwrap();
        let faltantes = report.discrepancias().iter().filter(|d| d.kind() == DiscrepancyKind::Faltante).count();
        let no_reg = report.discrepancias().iter().filter(|d| d.kind() == DiscrepancyKind::NoRegistrado).count();
        prop_assert_eq!(report.faltantes_count(), faltantes);
        prop_assert_eq!(report.no_registrados_count(), no_reg);
    }

    #[test]
    fn no_double_counting(expected in equipment(), scan in scan(), index in org_index(), s in scope()) {
        let report = reconcile("L1", &expected, &scan, &index, &policy(s)).unwrap();
        let mut seen = HashSet::new();
        for d in report.discrepancias() {
            prop_assert!(seen.insert(d.clone()), "duplicate discrepancy {:?}", d);
        }
    }

    #[test]
    fn complete_under_location_scope(expected in equipment(), scan in scan()) {
        let report = reconcile("L1", &expected, &scan, &[], &policy(UnregisteredScope::Location)).unwrap();
        let read = scanned_set(&scan);
        let registered: HashSet<String> = expected.iter().filter_map(|e| e.tag().map(str::to_string)).collect();

        let missing: HashSet<&str> = report.faltantes().collect();
        for e in &expected {
            match e.tag() {
                Some(t) if !read.contains(t) => prop_assert!(missing.contains(e.equipo_id.as_str())),
                _ => prop_assert!(!missing.contains(e.equipo_id.as_str())),
            }
        }

        let unregistered: HashSet<&str> = report.no_registrados().collect();
        let want: HashSet<&str> = read.iter().filter(|t| !registered.contains(*t)).map(String::as_str).collect();
        prop_assert_eq!(unregistered, want);
    }

    #[test]
    fn every_read_lands_once_under_organization_scope(
        expected in equipment(),
        scan in scan(),
        elsewhere in org_index(),
        stale in prop::collection::vec(tag(), 0..3),
    ) {
        // Index: the location's own equipment, equipment elsewhere, and
        // entries at this location that the expected list does not carry.
        let mut index: Vec<RegisteredTag> = expected
            .iter()
            .filter_map(|e| e.tag().map(|t| RegisteredTag {
                rfid_tag_id: t.to_string(),
                equipo_id: e.equipo_id.clone(),
                ubicacion_id: "L1".into(),
            }))
            .collect();
        index.extend(elsewhere);
        index.extend(stale.into_iter().enumerate().map(|(i, t)| RegisteredTag {
            rfid_tag_id: t,
            equipo_id: format!("S{i}"),
            ubicacion_id: "L1".into(),
        }));

        let report = reconcile("L1", &expected, &scan, &index, &policy(UnregisteredScope::Organization)).unwrap();
        let registered: HashSet<String> = expected.iter().filter_map(|e| e.tag().map(str::to_string)).collect();
        let unregistered: HashSet<&str> = report.no_registrados().collect();
        let misplaced: HashSet<&str> = report.fuera_de_ubicacion().iter().map(|m| m.rfid_tag_id.as_str()).collect();

        for m in report.fuera_de_ubicacion() {
            prop_assert_ne!(m.ubicacion_id.as_str(), "L1");
        }
        for t in scanned_set(&scan) {
            let places = [
                registered.contains(&t),
                unregistered.contains(t.as_str()),
                misplaced.contains(t.as_str()),
            ];
            prop_assert_eq!(places.iter().filter(|p| **p).count(), 1, "read {} in {:?}", t, places);
        }
        prop_assert_eq!(unregistered.len() + misplaced.len(), report.no_registrados_count() + report.fuera_de_ubicacion().len());
    }

    #[test]
    fn idempotent(expected in equipment(), scan in scan(), index in org_index(), s in scope()) {
        let a = reconcile("L1", &expected, &scan, &index, &policy(s)).unwrap();
        let b = reconcile("L1", &expected, &scan, &index, &policy(s)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn faltantes_always_first(expected in equipment(), scan in scan(), s in scope()) {
        let report = reconcile("L1", &expected, &scan, &[], &policy(s)).unwrap();
        let kinds: Vec<DiscrepancyKind> = report.discrepancias().iter().map(Discrepancy::kind).collect();
        let split = kinds.iter().take_while(|k| **k == DiscrepancyKind::Faltante).count();
        prop_assert!(kinds[split..].iter().all(|k| *k == DiscrepancyKind::NoRegistrado));
    }

    #[test]
    fn scanning_every_registered_tag_is_clean(expected in equipment(), s in scope()) {
        let scan: Vec<String> = expected.iter().filter_map(|e| e.tag().map(str::to_string)).collect();
        let report = reconcile("L1", &expected, &scan, &[], &policy(s)).unwrap();
        prop_assert!(report.is_clean());
    }
}

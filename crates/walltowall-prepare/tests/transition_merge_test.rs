//! Transition-rule assembly: pooling tiler and user rules into one
//! rectangular table.

use std::collections::BTreeSet;
use std::path::Path;

use proptest::prelude::*;
use walltowall_core::errors::TransitionError;
use walltowall_prepare::transitions::assembler::{merge_rules, undisturbed_output_path};
use walltowall_prepare::TransitionRuleAssembler;

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}

fn column<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    let i = header.iter().position(|h| h == name).unwrap();
    &row[i]
}

fn classifiers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn no_sources_means_no_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let merged = merge_rules(&dir.path().join("transition_rules.csv"), None, &[], &output).unwrap();
    assert!(merged.is_none());
    assert!(!output.exists());
}

#[test]
fn missing_user_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = merge_rules(
        &dir.path().join("transition_rules.csv"),
        Some(dir.path().join("user.csv").as_path()),
        &[],
        &dir.path().join("out.csv"),
    );
    assert!(matches!(result, Err(TransitionError::Read { .. })));
}

#[test]
fn pools_sources_and_fills_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let tiler = dir.path().join("transition_rules.csv");
    let user = dir.path().join("user.csv");
    std::fs::write(&tiler, "id,regen_delay,age_after,LdSpp\n1,0,5,BF\n").unwrap();
    std::fs::write(&user, "disturbance_type,AU,LdSpp_match\nClearcut,AU1,PJ\n").unwrap();

    let output = dir.path().join("db").join("gcbmwalltowall_transitions.csv");
    let merged = merge_rules(&tiler, Some(user.as_path()), &classifiers(&["LdSpp", "Zone"]), &output)
        .unwrap()
        .unwrap();
    assert_eq!(merged, output);

    let (header, rows) = read_csv(&output);
    assert_eq!(
        header,
        vec![
            "id",
            "age_reset_type",
            "disturbance_type",
            "LdSpp_match",
            "Zone_match",
            "age_after",
            "regen_delay",
            "AU",
            "LdSpp",
            "Zone",
        ]
    );
    assert_eq!(rows.len(), 2);

    let tiler_row = &rows[0];
    assert_eq!(column(&header, tiler_row, "id"), "1");
    assert_eq!(column(&header, tiler_row, "LdSpp"), "BF");
    assert_eq!(column(&header, tiler_row, "AU"), "?");
    assert_eq!(column(&header, tiler_row, "Zone"), "?");
    assert_eq!(column(&header, tiler_row, "disturbance_type"), "");
    assert_eq!(column(&header, tiler_row, "age_reset_type"), "absolute");
    assert_eq!(column(&header, tiler_row, "LdSpp_match"), "");

    let user_row = &rows[1];
    assert!(!column(&header, user_row, "id").is_empty());
    assert_eq!(column(&header, user_row, "regen_delay"), "0");
    assert_eq!(column(&header, user_row, "age_after"), "");
    assert_eq!(column(&header, user_row, "LdSpp_match"), "PJ");
    assert_eq!(column(&header, user_row, "AU"), "AU1");
}

#[test]
fn rerunning_keeps_existing_ids() {
    let dir = tempfile::TempDir::new().unwrap();
    let tiler = dir.path().join("transition_rules.csv");
    std::fs::write(&tiler, "id,regen_delay,LdSpp\n,0,BF\n,3,PJ\n").unwrap();

    let first = dir.path().join("first.csv");
    merge_rules(&tiler, None, &classifiers(&["LdSpp"]), &first).unwrap();
    let (header, first_rows) = read_csv(&first);
    let ids: BTreeSet<&str> = first_rows.iter().map(|r| column(&header, r, "id")).collect();
    assert_eq!(ids.len(), 2);

    let second = dir.path().join("second.csv");
    merge_rules(&first, None, &classifiers(&["LdSpp"]), &second).unwrap();
    assert_eq!(read_csv(&second), (header, first_rows));
}

#[test]
fn header_only_source_produces_header_only_output() {
    let dir = tempfile::TempDir::new().unwrap();
    let tiler = dir.path().join("transition_rules.csv");
    std::fs::write(&tiler, "id,regen_delay,age_after\n").unwrap();

    let output = dir.path().join("out.csv");
    merge_rules(&tiler, None, &classifiers(&["LdSpp"]), &output).unwrap();
    let (header, rows) = read_csv(&output);
    assert!(header.contains(&"LdSpp".to_string()));
    assert!(rows.is_empty());
}

#[test]
fn prepare_replaces_stale_outputs_and_merges_undisturbed() {
    let dir = tempfile::TempDir::new().unwrap();
    let tiled = dir.path().join("tiled");
    std::fs::create_dir_all(&tiled).unwrap();
    std::fs::write(
        tiled.join("undisturbed_transition_rules.csv"),
        "id,regen_delay,age_after,LdSpp\n1,0,,BF\n",
    )
    .unwrap();

    let output = dir.path().join("gcbmwalltowall_transitions.csv");
    std::fs::write(&output, "stale").unwrap();

    let prepared = TransitionRuleAssembler::new(classifiers(&["LdSpp"]))
        .prepare(&tiled, &output)
        .unwrap();

    assert!(prepared.disturbed.is_none());
    assert!(!output.exists());
    let undisturbed = prepared.undisturbed.unwrap();
    assert_eq!(undisturbed, undisturbed_output_path(&output));
    assert_eq!(
        undisturbed.file_name().unwrap(),
        "gcbmwalltowall_undisturbed_transitions.csv"
    );
    let (header, rows) = read_csv(&undisturbed);
    assert_eq!(column(&header, &rows[0], "LdSpp"), "BF");
}

#[test]
fn undisturbed_user_rules_merge_separately() {
    let dir = tempfile::TempDir::new().unwrap();
    let user = dir.path().join("user.csv");
    let user_undisturbed = dir.path().join("user_undisturbed.csv");
    std::fs::write(&user, "LdSpp\nBF\n").unwrap();
    std::fs::write(&user_undisturbed, "LdSpp\nPJ\nBS\n").unwrap();

    let output = dir.path().join("gcbmwalltowall_transitions.csv");
    let prepared = TransitionRuleAssembler::new(classifiers(&["LdSpp"]))
        .with_user_rules(Some(user))
        .with_user_rules_undisturbed(Some(user_undisturbed))
        .prepare(&dir.path().join("tiled"), &output)
        .unwrap();

    assert_eq!(read_csv(&prepared.disturbed.unwrap()).1.len(), 1);
    assert_eq!(read_csv(&prepared.undisturbed.unwrap()).1.len(), 2);
}

fn row_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map(
        prop::sample::select(vec!["id", "regen_delay", "age_after", "AU", "LdSpp", "Zone_match"]),
        "[A-Za-z0-9]{1,4}",
        0..6,
    )
    .prop_map(|m| m.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

fn write_source(path: &Path, rows: &[Vec<(String, String)>]) {
    let columns: Vec<&String> = rows
        .iter()
        .flatten()
        .map(|(k, _)| k)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut writer = csv::Writer::from_path(path).unwrap();
    if columns.is_empty() {
        writer.write_record(["id"]).unwrap();
    } else {
        writer.write_record(&columns).unwrap();
    }
    for row in rows {
        if columns.is_empty() {
            writer.write_record([""]).unwrap();
            continue;
        }
        let record: Vec<&str> = columns
            .iter()
            .map(|c| row.iter().find(|(k, _)| k == *c).map_or("", |(_, v)| v.as_str()))
            .collect();
        writer.write_record(&record).unwrap();
    }
    writer.flush().unwrap();
}

proptest! {
    #[test]
    fn merged_table_is_rectangular(
        tiler_rows in prop::collection::vec(row_strategy(), 0..5),
        user_rows in prop::collection::vec(row_strategy(), 0..5),
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let tiler = dir.path().join("transition_rules.csv");
        let user = dir.path().join("user.csv");
        write_source(&tiler, &tiler_rows);
        write_source(&user, &user_rows);

        let output = dir.path().join("out.csv");
        let configured = classifiers(&["LdSpp", "Species"]);
        merge_rules(&tiler, Some(user.as_path()), &configured, &output).unwrap();

        let (header, rows) = read_csv(&output);
        prop_assert_eq!(rows.len(), tiler_rows.len() + user_rows.len());
        for name in ["id", "regen_delay", "age_after", "disturbance_type", "age_reset_type",
                     "LdSpp", "LdSpp_match", "Species", "Species_match"] {
            prop_assert!(header.iter().any(|h| h == name), "missing column {}", name);
        }
        for row in &rows {
            prop_assert_eq!(row.len(), header.len());
            prop_assert!(!column(&header, row, "id").trim().is_empty());
        }
    }
}

#[test]
fn same_file_as_tiler_and_user_rules_doubles_rows() {
    let dir = tempfile::TempDir::new().unwrap();
    let rules = dir.path().join("transition_rules.csv");
    std::fs::write(&rules, "id,regen_delay,LdSpp\n7,0,BF\n,3,PJ\n").unwrap();

    let output = dir.path().join("out.csv");
    merge_rules(&rules, Some(rules.as_path()), &classifiers(&["LdSpp"]), &output)
        .unwrap()
        .unwrap();

    let (header, rows) = read_csv(&output);
    assert_eq!(rows.len(), 4);

    let ids: Vec<&str> = rows.iter().map(|row| column(&header, row, "id")).collect();
    assert_eq!(ids[0], "7");
    assert_eq!(ids[2], "7");
    assert!(!ids[1].is_empty() && !ids[3].is_empty());
    assert_ne!(ids[1], ids[3]);
    assert!(ids[1] != "7" && ids[3] != "7");

    for (first, second) in rows[..2].iter().zip(&rows[2..]) {
        for name in header.iter().filter(|name| *name != "id") {
            assert_eq!(column(&header, first, name), column(&header, second, name));
        }
    }
    assert_eq!(column(&header, &rows[1], "regen_delay"), "3");
    assert_eq!(column(&header, &rows[1], "LdSpp"), "PJ");
}

use bench_core::error::BenchError;
use bench_core::raw::RawFile;
use bench_core::traces::{LogicalSignal, TraceResolver};
use bench_models::ModelRecord;
use std::path::PathBuf;

fn abs(path: &str) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(format!("C:{}", path))
    } else {
        PathBuf::from(path)
    }
}

fn model(pins: &[&str]) -> ModelRecord {
    ModelRecord::new(
        "NMOS_A",
        abs("/models/a.lib"),
        pins.iter().map(|p| p.to_string()).collect(),
    )
    .expect("model")
}

fn raw_with_traces(names: &[&str]) -> RawFile {
    let mut text = String::new();
    text.push_str("Title: t\nPlotname: DC transfer characteristic\nFlags: real\n");
    text.push_str(&format!("No. Variables: {}\n", names.len()));
    text.push_str("No. Points: 2\n");
    text.push_str("Variables:\n");
    for (idx, name) in names.iter().enumerate() {
        text.push_str(&format!("\t{}\t{}\tvoltage\n", idx, name));
    }
    text.push_str("Values:\n");
    for point in 0..2 {
        text.push_str(&format!(" {}\t{}.0\n", point, point));
        for _ in 1..names.len() {
            text.push_str(&format!("\t{}.5\n", point));
        }
    }
    RawFile::parse(text.as_bytes()).expect("synthetic raw")
}

#[test]
fn drain_current_matches_first_candidate() {
    let raw = raw_with_traces(&["v(v_g_d)", "Ix(xu1:D)"]);
    let model = model(&["D", "G", "S"]);
    let resolver = TraceResolver::new(&raw, &model);
    let resolved = resolver
        .resolve(LogicalSignal::DrainCurrent)
        .expect("resolve");
    assert_eq!(resolved.name, "Ix(xu1:D)");
}

#[test]
fn drain_current_matches_synonym_spelling() {
    let raw = raw_with_traces(&["v(v_g_d)", "Ix(xu1:DRAIN)"]);
    let model = model(&["D", "G", "S"]);
    let resolver = TraceResolver::new(&raw, &model);
    let resolved = resolver
        .resolve(LogicalSignal::DrainCurrent)
        .expect("resolve");
    assert_eq!(resolved.name, "Ix(xu1:DRAIN)");
}

#[test]
fn declared_pin_name_outranks_synonyms() {
    // Both spellings present; the record declares DRAIN, so it wins.
    let raw = raw_with_traces(&["v(v_g_d)", "Ix(xu1:D)", "Ix(xu1:DRAIN)"]);
    let model = model(&["DRAIN", "GATE", "SOURCE"]);
    let resolver = TraceResolver::new(&raw, &model);
    let resolved = resolver
        .resolve(LogicalSignal::DrainCurrent)
        .expect("resolve");
    assert_eq!(resolved.name, "Ix(xu1:DRAIN)");
}

#[test]
fn bare_device_fallback_is_last_resort() {
    let raw = raw_with_traces(&["v(v_g_d)", "Id(m1)"]);
    let model = model(&["D", "G", "S"]);
    let resolver = TraceResolver::new(&raw, &model);
    let resolved = resolver
        .resolve(LogicalSignal::DrainCurrent)
        .expect("resolve");
    assert_eq!(resolved.name, "Id(m1)");
}

#[test]
fn gate_voltage_prefers_template_net_label() {
    let raw = raw_with_traces(&["v(v_g_d)", "Ix(xu1:D)"]);
    let model = model(&["D", "G", "S"]);
    let resolver = TraceResolver::new(&raw, &model);
    let resolved = resolver
        .resolve(LogicalSignal::GateVoltage)
        .expect("resolve");
    assert_eq!(resolved.name, "v(v_g_d)");
}

#[test]
fn failure_enumerates_every_attempted_candidate() {
    let raw = raw_with_traces(&["v(v_g_d)", "v(n001)"]);
    let model = model(&["D", "G", "S"]);
    let resolver = TraceResolver::new(&raw, &model);
    let err = resolver
        .resolve(LogicalSignal::DrainCurrent)
        .expect_err("resolved");
    match err {
        BenchError::TraceNotFound { attempted, .. } => {
            assert_eq!(
                attempted,
                vec![
                    "Ix(xu1:D)".to_string(),
                    "Ix(xu1:DRAIN)".to_string(),
                    "Id(xu1)".to_string(),
                    "Id(m1)".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

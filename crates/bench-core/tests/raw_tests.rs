use bench_core::error::BenchError;
use bench_core::raw::{RawFile, TraceValues};

fn ascii_raw(points: &[(f64, f64)]) -> String {
    let mut out = String::new();
    out.push_str("Title: * vth characterization\n");
    out.push_str("Date: Thu Aug  7 12:00:00 2025\n");
    out.push_str("Plotname: DC transfer characteristic\n");
    out.push_str("Flags: real\n");
    out.push_str("No. Variables: 2\n");
    out.push_str(&format!("No. Points: {}\n", points.len()));
    out.push_str("Variables:\n");
    out.push_str("\t0\tv(v_g_d)\tvoltage\n");
    out.push_str("\t1\tIx(xu1:D)\tdevice_current\n");
    out.push_str("Values:\n");
    for (idx, (vgs, id)) in points.iter().enumerate() {
        out.push_str(&format!(" {}\t{:e}\n", idx, vgs));
        out.push_str(&format!("\t{:e}\n", id));
    }
    out
}

fn binary_raw(points: &[(f64, f64)]) -> Vec<u8> {
    let mut out = String::new();
    out.push_str("Title: * vth characterization\n");
    out.push_str("Plotname: DC transfer characteristic\n");
    out.push_str("Flags: real\n");
    out.push_str("No. Variables: 2\n");
    out.push_str(&format!("No. Points: {}\n", points.len()));
    out.push_str("Variables:\n");
    out.push_str("\t0\tv(v_g_d)\tvoltage\n");
    out.push_str("\t1\tIx(xu1:D)\tdevice_current\n");
    out.push_str("Binary:\n");
    let mut bytes = out.into_bytes();
    for (vgs, id) in points {
        bytes.extend_from_slice(&vgs.to_le_bytes());
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    bytes
}

const POINTS: &[(f64, f64)] = &[
    (0.0, 1e-9),
    (0.5, 1e-7),
    (1.0, 1e-5),
    (1.5, 1e-3),
    (2.0, 1e-2),
];

#[test]
fn parses_ascii_values_section() {
    let raw = RawFile::parse(ascii_raw(POINTS).as_bytes()).expect("parse");
    assert_eq!(raw.points, 5);
    assert_eq!(raw.trace_names(), vec!["v(v_g_d)", "Ix(xu1:D)"]);
    let axis = raw.axis().expect("axis");
    assert_eq!(axis.values.as_real().expect("real"), &[0.0, 0.5, 1.0, 1.5, 2.0]);
}

#[test]
fn parses_binary_section() {
    let raw = RawFile::parse(&binary_raw(POINTS)).expect("parse");
    assert_eq!(raw.points, 5);
    let id = raw.trace("Ix(xu1:D)").expect("trace");
    let values = id.values.as_real().expect("real");
    assert!((values[3] - 1e-3).abs() < 1e-18);
}

#[test]
fn ascii_and_binary_agree() {
    let from_ascii = RawFile::parse(ascii_raw(POINTS).as_bytes()).expect("ascii");
    let from_binary = RawFile::parse(&binary_raw(POINTS)).expect("binary");
    let a = from_ascii.trace("Ix(xu1:D)").expect("trace");
    let b = from_binary.trace("Ix(xu1:D)").expect("trace");
    let a = a.values.as_real().expect("real");
    let b = b.values.as_real().expect("real");
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((x - y).abs() < 1e-15);
    }
}

#[test]
fn trace_lookup_falls_back_to_case_insensitive() {
    let raw = RawFile::parse(ascii_raw(POINTS).as_bytes()).expect("parse");
    let trace = raw.trace("ix(XU1:d)").expect("case-insensitive lookup");
    assert_eq!(trace.name, "Ix(xu1:D)");
}

#[test]
fn stepped_run_is_segmented_on_axis_reset() {
    let mut points = Vec::new();
    for _step in 0..3 {
        for i in 0..4 {
            points.push((i as f64 * 0.5, 1e-6 * (i + 1) as f64));
        }
    }
    let raw = RawFile::parse(ascii_raw(&points).as_bytes()).expect("parse");
    assert_eq!(raw.step_count(), 3);
    assert_eq!(raw.step_range(1), Some(4..8));
    let axis = raw.axis().expect("axis");
    let slice = raw.step_slice(axis, 2).expect("step slice");
    assert_eq!(slice, &[0.0, 0.5, 1.0, 1.5]);
}

#[test]
fn complex_flag_yields_complex_traces() {
    let text = "Title: ac\nPlotname: AC Analysis\nFlags: complex\n\
No. Variables: 1\nNo. Points: 2\nVariables:\n\t0\tfrequency\tfrequency\n\
Values:\n 0\t1.0,0.0\n 1\t10.0,0.5\n";
    let raw = RawFile::parse(text.as_bytes()).expect("parse");
    let trace = raw.trace("frequency").expect("trace");
    match &trace.values {
        TraceValues::Complex(values) => {
            assert_eq!(values.len(), 2);
            assert!((values[1].im - 0.5).abs() < 1e-15);
        }
        TraceValues::Real(_) => panic!("expected complex samples"),
    }
}

#[test]
fn truncated_binary_payload_is_malformed() {
    let mut bytes = binary_raw(POINTS);
    bytes.truncate(bytes.len() - 8);
    let err = RawFile::parse(&bytes).expect_err("parsed");
    assert!(matches!(err, BenchError::MalformedWaveform(_)));
}

#[test]
fn unparseable_ascii_sample_is_malformed() {
    let text = ascii_raw(POINTS).replace("1e-5", "masked");
    let err = RawFile::parse(text.as_bytes()).expect_err("parsed");
    assert!(matches!(err, BenchError::MalformedWaveform(_)));
}

#[test]
fn missing_data_section_is_malformed() {
    let text = "Title: t\nPlotname: p\nFlags: real\nNo. Variables: 1\nNo. Points: 1\n\
Variables:\n\t0\tv(a)\tvoltage\n";
    let err = RawFile::parse(text.as_bytes()).expect_err("parsed");
    assert!(matches!(err, BenchError::MalformedWaveform(_)));
}

use bench_core::error::BenchError;
use bench_core::netlist::NetlistDoc;
use std::path::PathBuf;

const COMPILED: &str = "* compiled from vth_test.asc\n\
XU1 v_g_d v_g_d 0 {MODEL_NAME}\n\
V1 v_g_d 0 0\n\
.backanno\n\
.end\n";

fn write_netlist(name: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(name);
    std::fs::write(&path, content).expect("write netlist");
    path
}

#[test]
fn set_model_reference_rewrites_subckt_name() {
    let path = write_netlist("bench_netlist_set_model.net", COMPILED);
    let mut doc = NetlistDoc::open(&path).expect("open");
    doc.set_model_reference("XU1", "NMOS_A").expect("set model");
    let rendered = doc.render();
    assert!(rendered.contains("XU1 v_g_d v_g_d 0 NMOS_A"));
    assert!(!rendered.contains("{MODEL_NAME}"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn set_model_reference_skips_parameter_tokens() {
    let path = write_netlist(
        "bench_netlist_params.net",
        "XU1 d g s {MODEL_NAME} temp=27 m=1\n.end\n",
    );
    let mut doc = NetlistDoc::open(&path).expect("open");
    doc.set_model_reference("XU1", "NMOS_A").expect("set model");
    assert!(doc.render().contains("XU1 d g s NMOS_A temp=27 m=1"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn set_model_reference_requires_netlist_stage_name() {
    let path = write_netlist("bench_netlist_wrong_name.net", COMPILED);
    let mut doc = NetlistDoc::open(&path).expect("open");
    // The schematic-stage name has no card in the compiled netlist.
    let err = doc.set_model_reference("U1", "NMOS_A").expect_err("matched");
    assert!(matches!(err, BenchError::Compilation(_)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn add_directives_preserves_order_before_end_card() {
    let path = write_netlist("bench_netlist_directives.net", COMPILED);
    let mut doc = NetlistDoc::open(&path).expect("open");
    doc.add_directives([".options plotwinsize=0", ".options plotwinsize=256"]);
    let rendered = doc.render();
    let first = rendered
        .find(".options plotwinsize=0")
        .expect("first directive");
    let second = rendered
        .find(".options plotwinsize=256")
        .expect("second directive");
    let end = rendered.find(".end").expect("end card");
    assert!(first < second, "directive order not preserved");
    assert!(second < end, "directives must precede .end");
    std::fs::remove_file(&path).ok();
}

#[test]
fn save_writes_edited_document() {
    let path = write_netlist("bench_netlist_save.net", COMPILED);
    let mut doc = NetlistDoc::open(&path).expect("open");
    doc.set_model_reference("XU1", "NMOS_A").expect("set model");
    doc.add_directives([".lib \"/abs/models/a.lib\"", ".dc V1 0 5 0.05"]);
    let saved = doc.save().expect("save");
    assert_eq!(saved, path);
    let content = std::fs::read_to_string(&path).expect("read back");
    assert!(content.contains("NMOS_A"));
    assert!(content.contains(".lib \"/abs/models/a.lib\""));
    assert!(content.contains(".dc V1 0 5 0.05"));
    std::fs::remove_file(&path).ok();
}

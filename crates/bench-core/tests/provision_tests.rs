use bench_core::error::BenchError;
use bench_core::provision::provision;
use bench_core::template::VTH_TEMPLATE_SYMBOLS;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(name);
    std::fs::remove_dir_all(&dir).ok();
    dir
}

#[test]
fn provisioning_copies_template_symbols() {
    let dir = scratch_dir("bench_provision_copies");
    let paths = provision(&dir, VTH_TEMPLATE_SYMBOLS).expect("provision");
    assert_eq!(paths.len(), VTH_TEMPLATE_SYMBOLS.len());
    for path in &paths {
        assert!(path.exists(), "missing {}", path.display());
    }
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn provisioning_twice_is_idempotent() {
    let dir = scratch_dir("bench_provision_idempotent");
    provision(&dir, VTH_TEMPLATE_SYMBOLS).expect("first provision");
    let first = std::fs::read_to_string(dir.join("generic_nmos.asy")).expect("read");
    provision(&dir, VTH_TEMPLATE_SYMBOLS).expect("second provision");
    let second = std::fs::read_to_string(dir.join("generic_nmos.asy")).expect("read");
    assert_eq!(first, second);
    let entries = std::fs::read_dir(&dir).expect("read dir").count();
    assert_eq!(entries, VTH_TEMPLATE_SYMBOLS.len());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn provisioning_replaces_stale_copy() {
    let dir = scratch_dir("bench_provision_stale");
    std::fs::create_dir_all(&dir).expect("mkdir");
    let dest = dir.join("generic_nmos.asy");
    std::fs::write(&dest, "stale contents").expect("write stale");
    provision(&dir, VTH_TEMPLATE_SYMBOLS).expect("provision");
    let restored = std::fs::read_to_string(&dest).expect("read");
    assert!(restored.contains("SymbolType CELL"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unknown_symbol_is_a_missing_dependency() {
    let dir = scratch_dir("bench_provision_unknown");
    let err = provision(&dir, &["not_bundled.asy"]).expect_err("provisioned");
    assert!(matches!(err, BenchError::MissingDependency(_)));
    std::fs::remove_dir_all(&dir).ok();
}

use std::{env, fs, process};

use crate::dmi::is_legion_go;

#[test]
fn test_is_legion_go() {
    let path = env::temp_dir().join(format!("padbridge-dmi-{}", process::id()));
    fs::write(&path, "83E1\n").unwrap();
    assert!(is_legion_go(&path));
    fs::write(&path, "Jupiter\n").unwrap();
    assert!(!is_legion_go(&path));
    fs::remove_file(&path).unwrap();
    assert!(!is_legion_go(&path), "missing file is not a Legion Go");
}

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const DIAMOND: &str = r#"{
  "components": [
    { "id": "app", "dependencies": [
        { "requested": "left", "selected": "left" },
        { "requested": "right", "selected": "right" } ] },
    { "id": "left", "dependencies": [ { "requested": "shared:1", "selected": "shared" } ] },
    { "id": "right", "dependencies": [ { "requested": "shared:2", "selected": "shared" } ] },
    { "id": "shared" }
  ],
  "groups": [
    { "name": "compileClasspath", "dependencies": [ { "requested": "app", "selected": "app" } ] },
    { "name": "runtimeClasspath", "dependencies": [
        { "requested": "left", "selected": "left" },
        { "requested": "missing:lib:1.0", "reason": "not found" } ] }
  ]
}"#;

pub fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("snapshot.json");
    std::fs::write(&path, DIAMOND).unwrap();
    path
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use loradec_core::{DeviceKind, DeviceRegistry, decode_uplinks_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.jsonl");
        if !input.exists() {
            continue;
        }
        let registry = load_registry(&path.join("devices.json"))?;
        let output = path.join("expected_report.json");
        regenerate_one(&input, &registry, &output)?;
    }

    Ok(())
}

fn load_registry(path: &Path) -> Result<DeviceRegistry, String> {
    if !path.exists() {
        return Ok(DeviceRegistry::new());
    }
    let json = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    let devices: HashMap<String, DeviceKind> = serde_json::from_str(&json)
        .map_err(|err| format!("invalid devices file {}: {}", path.display(), err))?;
    Ok(devices.into_iter().collect())
}

fn regenerate_one(input: &Path, registry: &DeviceRegistry, output: &Path) -> Result<(), String> {
    let report = decode_uplinks_file(input, registry)
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}

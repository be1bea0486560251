use std::process::Command;

use serde_json::Value;

fn verif() -> Command {
    Command::new(env!("CARGO_BIN_EXE_verif"))
}

/// 6x6 field: events on a diagonal band, forecast shifted one column.
fn grid_pairs() -> String {
    let (nx, ny) = (6, 6);
    let obs: Vec<f64> = (0..nx * ny)
        .map(|k| if (k % nx + k / nx) % 3 == 0 { 4.0 } else { 0.0 })
        .collect();
    let fcst: Vec<f64> = (0..nx * ny)
        .map(|k| if k % nx == 0 { 0.0 } else { obs[k - 1] })
        .collect();
    serde_json::json!({ "fcst": fcst, "obs": obs, "grid": { "nx": nx, "ny": ny } }).to_string()
}

#[test]
fn stats_writes_every_requested_family() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.json");
    let config = dir.path().join("verif.toml");
    let output = dir.path().join("out.json");
    std::fs::write(&pairs, grid_pairs()).unwrap();
    std::fs::write(
        &config,
        r#"
        alpha = [0.05, 0.1]
        families = ["cts", "cnt", "nbrcnt"]
        [thresholds]
        fcst = ">1"
        obs = ">1"
        [resample]
        method = "percentile"
        n_rep = 100
        "#,
    )
    .unwrap();

    let status = verif()
        .args(["stats", "--seed", "5", "--pairs"])
        .arg(&pairs)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .status()
        .unwrap();
    assert!(status.success());

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["CTS"]["TOTAL"]["value"], 36.0);
    assert_eq!(doc["CTS"]["CSI"]["bcl"].as_array().unwrap().len(), 2);
    assert!(doc["CNT"]["RMSE"]["value"].as_f64().unwrap() > 0.0);
    let fss = doc["NBRCNT"]["FSS"]["value"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&fss));
}

#[test]
fn seeded_runs_write_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.json");
    std::fs::write(&pairs, grid_pairs()).unwrap();

    let run = || {
        let out = verif()
            .args(["stats", "--seed", "11", "--pairs"])
            .arg(&pairs)
            .output()
            .unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn bad_config_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let pairs = dir.path().join("pairs.json");
    let config = dir.path().join("verif.toml");
    std::fs::write(&pairs, r#"{"fcst":[1,2,3],"obs":[1,2,3]}"#).unwrap();
    std::fs::write(&config, "[resample]\nmethod = \"jackknife\"\n").unwrap();

    let out = verif()
        .args(["stats", "--pairs"])
        .arg(&pairs)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("unknown bootstrap method"));
}

#[test]
fn list_stats_names_each_family() {
    let out = verif().arg("list-stats").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    for family in ["CTS:", "MCTS:", "CNT:", "PCT:", "NBRCTS:", "NBRCNT:"] {
        assert!(stdout.contains(family), "missing {family}");
    }
}

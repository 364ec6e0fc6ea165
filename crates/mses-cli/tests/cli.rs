use mses_core::mdat::{SolutionData, write_solution_file};
use mses_core::sensx::{
    BodyIndices, ModalScalars, ModeSide, SensitivityData, SensxSizing, ShapeMode,
    SurfaceSideData, write_sensitivity_file,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const POINTS: usize = 16;

fn stations() -> Vec<f64> {
    (0..POINTS)
        .map(|i| 0.5 * (1.0 - (std::f64::consts::PI * i as f64 / (POINTS - 1) as f64).cos()))
        .collect()
}

fn thickness(x: f64) -> f64 {
    0.6 * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
        - 0.1015 * x.powi(4))
}

fn side(sign: f64) -> SurfaceSideData {
    let x = stations();
    let y: Vec<f64> = x.iter().map(|x| sign * thickness(*x)).collect();
    let zeros = vec![0.0; POINTS];
    SurfaceSideData {
        xbi: x,
        ybi: y,
        cp: zeros.clone(),
        hk: zeros.clone(),
        cp_alfa: zeros.clone(),
        hk_alfa: zeros.clone(),
        cp_mach: zeros.clone(),
        hk_mach: zeros.clone(),
        cp_reyn: zeros.clone(),
        hk_reyn: zeros,
    }
}

fn sensitivity_fixture() -> SensitivityData {
    let ii = POINTS as i32 + 3;
    let indices = BodyIndices::from_raw(ii, 3, ii - 1);
    let x = stations();
    let modes = (0..2)
        .map(|mode| {
            let frequency = (mode + 1) as f64;
            ShapeMode {
                scalars: ModalScalars {
                    amplitude: 0.01,
                    al: 0.0,
                    cl: 0.25 * frequency,
                    cm: -0.05,
                    cdw: 0.001,
                    cdv: 0.002,
                    cdf: 0.0005,
                },
                sides: [(); 2]
                    .map(|_| ModeSide {
                        gn: vec![frequency; indices.gn_len()],
                        xbi: vec![0.0; POINTS],
                        ybi: x
                            .iter()
                            .map(|x| (frequency * std::f64::consts::PI * x).sin())
                            .collect(),
                        cp: vec![0.0; POINTS],
                        hk: vec![0.0; POINTS],
                    })
                    .to_vec(),
            }
        })
        .collect();

    let mut data = SensitivityData {
        code: "MSES".to_string(),
        name: "NACA 0012".to_string(),
        kalfa: 1,
        kmach: 1,
        kreyn: 1,
        alfa: 1.0,
        mach: 0.4,
        reyn: 5.0e6,
        sizing: SensxSizing {
            ii: ii as usize,
            nbl: 1,
            nmod: 2,
            npos: 0,
        },
        indices: vec![indices],
        geometry: vec![Default::default()],
        sides: vec![side(1.0), side(-1.0)],
        modes,
        ..SensitivityData::default()
    };
    data.forces.cl = 0.4;
    data.forces.alfa.cl = 0.1;
    data
}

/// Samples of the body outline running lower TE -> LE -> upper TE.
fn outline_samples(dy: f64) -> Vec<Value> {
    let data = sensitivity_fixture();
    let (upper, lower) = (&data.sides[0], &data.sides[1]);
    let lower_points = lower.xbi.iter().zip(&lower.ybi).rev();
    let upper_points = upper.xbi.iter().zip(&upper.ybi).skip(1);
    lower_points
        .chain(upper_points)
        .map(|(x, y)| json!({ "x": x, "y": y, "dx": 0.0, "dy": dy }))
        .collect()
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).expect("json")).expect("write json");
}

fn write_sensx(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("sensx.naca");
    write_sensitivity_file(&path, &sensitivity_fixture()).expect("write sensx");
    path
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mses-rs"))
        .args(args)
        .output()
        .expect("mses-rs should run")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn sensx_command_prints_a_summary() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);

    let output = run_cli(&["sensx", path_arg(&sensx)]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Name: NACA 0012"), "stdout: {stdout}");
    assert!(stdout.contains("Modes: 2"), "stdout: {stdout}");
}

#[test]
fn sensx_json_output_shows_renormalised_indices() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);

    let output = run_cli(&["sensx", path_arg(&sensx), "--json"]);
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["sizing"]["nmod"], 2);
    assert_eq!(parsed["indices"][0]["ileb"], 1);
    assert_eq!(parsed["forces"]["cl"], 0.4);
}

#[test]
fn mdat_command_reads_solution_snapshots() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("mdat.naca");
    let mut data = SolutionData {
        code: "MSES".to_string(),
        name: "empty grid".to_string(),
        ..SolutionData::default()
    };
    data.sizing.ii = 2;
    data.sizing.jj = 1;
    data.sizing.nbl = 1;
    data.switches.kalfa = 1;
    data.switches.kmach = 1;
    data.switches.kreyn = 1;
    data.edges = vec![mses_core::mdat::EdgeIndices { ileb: 1, iteb: 2 }];
    data.grid = vec![mses_core::mdat::GridLine {
        x: vec![0.0, 1.0],
        y: vec![0.0, 0.0],
    }];
    data.bodies = vec![mses_core::mdat::BodyStreamline {
        xb: vec![0.0, 1.0],
        yb: vec![0.0, 0.0],
        sb: vec![0.0, 1.0],
    }];
    let layer = mses_core::mdat::BoundaryLayerSide {
        xbi: vec![0.0, 1.0],
        ybi: vec![0.0; 2],
        sbi: vec![0.0, 1.0],
        theta: vec![0.0; 2],
        dstar: vec![0.0; 2],
        uedg: vec![1.0; 2],
        ctau: vec![0.0; 2],
        hk: vec![2.5; 2],
        cf: vec![0.0; 2],
    };
    data.boundary_layer = vec![layer.clone(), layer];
    data.frequencies = mses_core::mdat::FrequencyTables::from_sides(&[
        (vec![1.0], vec![0.1], vec![0.0]),
        (Vec::new(), Vec::new(), Vec::new()),
    ]);
    write_solution_file(&path, &data).expect("write mdat");

    let output = run_cli(&["mdat", path_arg(&path)]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Frequency entries: 1"), "stdout: {stdout}");
}

#[test]
fn project_command_reports_derivatives_per_component() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);
    let displacement = temp.path().join("displacement.json");
    write_json(
        &displacement,
        &json!({
            "components": [
                { "name": "frozen", "bodies": [ { "samples": outline_samples(0.0) } ] },
                { "name": "heave", "bodies": [ { "samples": outline_samples(0.01) } ] }
            ]
        }),
    );

    let output = run_cli(&[
        "project",
        "--sensx",
        path_arg(&sensx),
        "--displacement",
        path_arg(&displacement),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["driver"], "alpha");
    assert_eq!(report["modes"], 2);

    let components = report["components"].as_array().expect("components");
    assert_eq!(components.len(), 2);
    assert_eq!(components[0]["name"], "frozen");
    for key in ["Alpha", "CL", "CD", "CD_p", "CD_v", "CD_w", "CM"] {
        assert_eq!(components[0]["derivatives"][key], 0.0, "{key}");
    }
    assert!(components[1]["derivatives"]["CL"].as_f64().expect("CL").abs() > 0.0);
}

#[test]
fn project_command_applies_the_cl_driven_correction() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);
    let displacement = temp.path().join("displacement.json");
    write_json(
        &displacement,
        &json!({ "components": [ { "name": "heave", "bodies": [ { "samples": outline_samples(0.01) } ] } ] }),
    );

    let run = |extra: &[&str]| -> Value {
        let mut args = vec![
            "project",
            "--sensx",
            path_arg(&sensx),
            "--displacement",
            path_arg(&displacement),
        ];
        args.extend_from_slice(extra);
        let output = run_cli(&args);
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
    };

    let alpha = run(&[]);
    let fixed_cl = run(&["--cl-driven"]);
    assert_eq!(fixed_cl["driver"], "liftCoefficient");

    let raw_cl = alpha["components"][0]["derivatives"]["CL"].as_f64().expect("CL");
    let corrected_alpha = fixed_cl["components"][0]["derivatives"]["Alpha"]
        .as_f64()
        .expect("Alpha");
    let per_radian = 0.1 * std::f64::consts::PI / 180.0;
    assert!((corrected_alpha + raw_cl / per_radian).abs() <= 1.0e-9 * raw_cl.abs().max(1.0));
}

#[test]
fn failing_component_aborts_the_run_by_default() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);
    let displacement = temp.path().join("displacement.json");
    write_json(
        &displacement,
        &json!({
            "components": [
                { "name": "heave", "bodies": [ { "samples": outline_samples(0.01) } ] },
                { "name": "broken", "bodies": [ { "samples": [ { "x": 0.0, "y": 0.0, "dx": 0.0, "dy": 0.0 } ] } ] }
            ]
        }),
    );

    let output = run_cli(&[
        "project",
        "--sensx",
        path_arg(&sensx),
        "--displacement",
        path_arg(&displacement),
    ]);
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: [RUN.CURVE_FIT]"), "stderr: {stderr}");
    assert!(stderr.contains("FATAL EXIT CODE: 5"), "stderr: {stderr}");
}

#[test]
fn continue_policy_reports_failures_alongside_results() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);
    let displacement = temp.path().join("displacement.json");
    let config = temp.path().join("config.json");
    write_json(&config, &json!({ "failurePolicy": "continue" }));
    write_json(
        &displacement,
        &json!({
            "components": [
                { "name": "broken", "bodies": [] },
                { "name": "heave", "bodies": [ { "samples": outline_samples(0.01) } ] }
            ]
        }),
    );

    let output = run_cli(&[
        "project",
        "--sensx",
        path_arg(&sensx),
        "--displacement",
        path_arg(&displacement),
        "--config",
        path_arg(&config),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let report: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let components = report["components"].as_array().expect("components");
    assert_eq!(components[0]["error"]["placeholder"], "FORMAT.DISPLACEMENT_SHAPE");
    assert!(components[0].get("derivatives").is_none());
    assert!(components[1]["derivatives"]["CL"].is_number());
}

#[test]
fn missing_input_reports_an_io_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let missing = temp.path().join("sensx.absent");

    let output = run_cli(&["sensx", path_arg(&missing)]);
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[IO.SENSX_OPEN]"), "stderr: {stderr}");
}

#[test]
fn truncated_input_reports_a_format_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let sensx = write_sensx(&temp);
    let bytes = fs::read(&sensx).expect("read sensx");
    fs::write(&sensx, &bytes[..bytes.len() / 3]).expect("truncate sensx");

    let output = run_cli(&["sensx", path_arg(&sensx)]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[FORMAT.RECORD]"), "stderr: {stderr}");
}

#[test]
fn unknown_arguments_are_usage_errors() {
    let output = run_cli(&["sensx", "--no-such-flag"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[FORMAT.CLI_USAGE]"));
}

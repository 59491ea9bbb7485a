use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

/// Helper function to run tallygraph with arguments and optional stdin
fn run_tallygraph(args: &[&str], stdin: Option<&str>) -> Result<Vec<u8>, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tallygraph"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if let Some(mut handle) = child.stdin.take() {
        if let Some(content) = stdin {
            handle
                .write_all(content.as_bytes())
                .map_err(|e| format!("Failed to write to stdin: {}", e))?;
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

fn summary_json(args: &[&str], stdin: Option<&str>) -> serde_json::Value {
    let out = run_tallygraph(args, stdin).expect("summary failed");
    serde_json::from_slice(&out).expect("summary is not JSON")
}

#[test]
fn test_end_to_end_default_dashboard_png() {
    let result = run_tallygraph(&["render", "--source", "test/ev_sample.csv"], None);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_svg_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dashboard.svg");
    let result = run_tallygraph(
        &[
            "render",
            "--source",
            "test/ev_sample.csv",
            "--format",
            "svg",
            "--output",
            out.to_str().unwrap(),
        ],
        None,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_end_to_end_missing_source_renders_placeholder() {
    let result = run_tallygraph(&["render", "--source", "test/no_such_file.csv"], None);
    assert!(result.is_ok(), "Placeholder dashboard should still render: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

#[test]
fn test_end_to_end_summary_counts() {
    let json = summary_json(
        &[
            "summary",
            "--source",
            "test/ev_sample.csv",
            "--chart",
            "bar(column: Make)",
            "--chart",
            r#"line(column: "Model Year", order: "sorted")"#,
        ],
        None,
    );

    let makes = &json[0];
    assert_eq!(makes["name"], "chart1");
    assert_eq!(makes["column"], "Make");
    assert_eq!(makes["groups"][0]["key"], "TESLA");
    assert_eq!(makes["groups"][0]["count"], 5);
    assert_eq!(makes["groups"][1]["key"], "NISSAN");

    let years = json[1]["groups"].as_array().unwrap();
    let keys: Vec<&str> = years.iter().map(|g| g["key"].as_str().unwrap()).collect();
    assert_eq!(
        keys,
        vec!["2013", "2016", "2017", "2018", "2019", "2020", "2021", "2022"]
    );
    let total: u64 = years.iter().map(|g| g["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 12);
}

#[test]
fn test_end_to_end_summary_from_stdin() {
    let csv = "Make,Model Year\nTESLA,2020\nNISSAN,2019\nTESLA,2020\n";
    let json = summary_json(
        &["summary", "--source", "-", "--chart", "pie(column: Make)"],
        Some(csv),
    );
    assert_eq!(json[0]["chart"], "pie");
    assert_eq!(json[0]["groups"][0]["count"], 2);
    assert_eq!(json[0]["groups"][1]["count"], 1);
}

#[test]
fn test_end_to_end_summary_top_n() {
    let json = summary_json(
        &["summary", "--source", "test/ev_sample.csv", "--chart", "bar(column: County, top: 2)"],
        None,
    );
    let groups = json[0]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["key"], "Yakima");
    assert_eq!(groups[1]["key"], "King");
}

#[test]
fn test_end_to_end_summary_json_source() {
    let json = summary_json(
        &["summary", "--source", "test/ev_sample.json", "--chart", "bar(column: County)"],
        None,
    );
    let groups = json[0]["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["key"], "King");
}

#[test]
fn test_end_to_end_summary_missing_source_fails() {
    let result = run_tallygraph(&["summary", "--source", "test/no_such_file.csv"], None);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("failed to fetch"));
}

#[test]
fn test_end_to_end_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dashboard.json");
    fs::write(
        &config_path,
        r#"{
            "title": "Fuel types",
            "source": "test/ev_sample.csv",
            "width": 400,
            "height": 300,
            "charts": [
                {"name": "fuel", "spec": "pie(column: \"Electric Vehicle Type\")"}
            ]
        }"#,
    )
    .unwrap();

    let json = summary_json(&["summary", "--config", config_path.to_str().unwrap()], None);
    assert_eq!(json[0]["name"], "fuel");
    assert_eq!(json[0]["groups"][0]["key"], "Battery Electric Vehicle (BEV)");
    assert_eq!(json[0]["groups"][0]["count"], 8);

    let png = run_tallygraph(&["render", "--config", config_path.to_str().unwrap()], None);
    assert!(png.is_ok(), "Failed: {:?}", png.err());
    assert!(is_valid_png(&png.unwrap()));
}

#[test]
fn test_end_to_end_invalid_chart_spec() {
    let result = run_tallygraph(
        &["render", "--source", "test/ev_sample.csv", "--chart", "scatter(column: Make)"],
        None,
    );
    assert!(result.is_err(), "Should have failed with parse error");
    assert!(result.unwrap_err().contains("Parse error"));
}

#[test]
fn test_end_to_end_negative_top_is_recovered() {
    let json = summary_json(
        &["summary", "--source", "test/ev_sample.csv", "--chart", "bar(column: Make, top: -1)"],
        None,
    );
    assert_eq!(json[0]["groups"].as_array().unwrap().len(), 6);
}

#[test]
fn test_end_to_end_parse_command() {
    let out = run_tallygraph(&["parse", r#"bar(column: Make) | labs(title: "Makes")"#], None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Bar"));
    assert!(text.contains("Makes"));
}

#[test]
fn test_end_to_end_header_only_csv() {
    let result = run_tallygraph(&["render", "--source", "test/no_data.csv"], None);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()));
}

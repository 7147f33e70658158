use std::path::{Path, PathBuf};

use rmcp::{
    ServiceExt,
    model::CallToolRequestParams,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::json;

fn setup_fixture(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let corpus = json!({
        "documents": [
            {
                "id": 1,
                "name": "Audit Findings 2024",
                "folder": { "name": "Reports", "path": "/Audit/Reports" },
                "modifiedTime": "2024-03-01T00:00:00Z"
            },
            {
                "id": 2,
                "name": "Budget Analysis",
                "folder": { "name": "Finance", "path": "/Finance" }
            },
            {
                "id": 3,
                "name": "Team Offsite Photo",
                "folder": { "name": "Pictures", "path": "/Pictures" }
            }
        ]
    });
    let path = dir.join("corpus.json");
    std::fs::write(&path, serde_json::to_string(&corpus)?)?;
    Ok(path)
}

#[tokio::test]
async fn mcp_stdio_search_roundtrip() -> Result<(), Box<dyn std::error::Error>>
{
    let tempdir = tempfile::tempdir()?;
    let corpus = setup_fixture(tempdir.path())?;

    let bin = docsense_bin()?;
    let transport = TokioChildProcess::new(
        tokio::process::Command::new(bin).configure(|cmd| {
            cmd.arg("mcp")
                .arg("--corpus")
                .arg(&corpus)
                .env("XDG_CONFIG_HOME", tempdir.path())
                .env_remove("DOCSENSE_CONFIG");
        }),
    )?;

    let client = ().serve(transport).await?;

    let args = json!({
        "query": "documents from /Audit/Reports",
        "limit": 5
    });

    let result = client
        .peer()
        .call_tool(
            CallToolRequestParams::new("docsense_search")
                .with_arguments(args.as_object().unwrap().clone()),
        )
        .await?;

    let structured = result.structured_content.expect("structured content");
    let results = structured
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["item"]["id"], "1");
    assert_eq!(results[0]["item"]["type"], "document");
    assert_eq!(results[0]["matchType"], "hybrid");
    assert_eq!(structured["intent"]["folderPath"], "/Audit/Reports");

    let intent_result = client
        .peer()
        .call_tool(
            CallToolRequestParams::new("docsense_intent").with_arguments(
                json!({ "query": "latest 2 budget reports" })
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
        )
        .await?;
    let intent = intent_result
        .structured_content
        .expect("structured intent");
    assert_eq!(intent["quantity"], 2);
    assert_eq!(intent["ranking"], "latest");

    client.cancel().await?;
    Ok(())
}

fn docsense_bin() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(bin) = std::env::var("CARGO_BIN_EXE_docsense") {
        return Ok(PathBuf::from(bin));
    }

    let mut path = std::env::current_exe()?;
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("docsense");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    Ok(path)
}

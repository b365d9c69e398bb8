mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn dashboard_stats_are_public() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get_json("/api/dashboard/stats").await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["employees"]["total"], 10);
    assert_eq!(body["employees"]["active"], 10);
    assert_eq!(body["employees"]["byDepartment"][0]["department"], "Engineering");

    let tasks = &body["tasks"];
    assert_eq!(tasks["total"], 10);
    let by_status = tasks["pending"].as_i64().unwrap()
        + tasks["inProgress"].as_i64().unwrap()
        + tasks["completed"].as_i64().unwrap();
    assert_eq!(by_status, 10);

    let upcoming = body["recentActivity"]["upcomingDeadlines"].as_array().unwrap();
    assert!(upcoming.len() <= 5);
    assert!(upcoming.iter().all(|t| t["status"] != "completed"));
    assert_eq!(body["recentActivity"]["recentEmployees"].as_array().unwrap().len(), 5);
    Ok(())
}

#[tokio::test]
async fn performance_is_ranked_and_capped() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get_json("/api/dashboard/performance").await?;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert!(rows.len() <= 10);
    let completed: Vec<i64> = rows.iter().filter_map(|r| r["completed_tasks"].as_i64()).collect();
    assert!(completed.windows(2).all(|w| w[0] >= w[1]));
    assert!(rows[0]["first_name"].is_string());
    Ok(())
}

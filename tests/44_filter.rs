mod common;

use anyhow::Result;
use reqwest::StatusCode;

// List endpoints: filtering, sorting and pagination over the seeded data.

#[tokio::test]
async fn department_filter_is_exact() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get_json("/api/employees?department=Engineering").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 4);
    let data = body["data"].as_array().unwrap();
    assert!(data.iter().all(|e| e["department"] == "Engineering"));
    Ok(())
}

#[tokio::test]
async fn pagination_math() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get_json("/api/employees?page=3&limit=4").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 3);
    assert_eq!(body["pagination"]["limit"], 4);
    assert_eq!(body["pagination"]["total"], 10);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn sort_by_salary_ascending() -> Result<()> {
    let server = common::spawn_server().await?;

    let (_, body) = server.get_json("/api/employees?sortBy=salary&sortOrder=asc&limit=3").await?;
    let salaries: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["salary"].as_f64())
        .collect();
    assert_eq!(salaries, vec![55000.0, 60000.0, 65000.0]);
    Ok(())
}

#[tokio::test]
async fn hostile_sort_key_falls_back() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server
        .get_json("/api/employees?sortBy=salary%3B%20DROP%20TABLE%20employees&sortOrder=desc")
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 10);

    let (_, again) = server.get_json("/api/employees").await?;
    assert_eq!(again["pagination"]["total"], 10);
    Ok(())
}

#[tokio::test]
async fn search_matches_name_and_position() -> Result<()> {
    let server = common::spawn_server().await?;

    let (_, body) = server.get_json("/api/employees?search=developer").await?;
    assert_eq!(body["pagination"]["total"], 2);

    let (_, body) = server.get_json("/api/employees?search=garcia").await?;
    assert_eq!(body["data"][0]["first_name"], "Lisa");
    Ok(())
}

#[tokio::test]
async fn empty_parameters_mean_no_filter() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, body) = server.get_json("/api/tasks?status=&priority=&employee_id=&search=").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 10);
    Ok(())
}

#[tokio::test]
async fn task_filters_combine() -> Result<()> {
    let server = common::spawn_server().await?;

    let (_, body) = server.get_json("/api/tasks?priority=high&status=in_progress").await?;
    let data = body["data"].as_array().unwrap();
    assert_eq!(body["pagination"]["total"], 2);
    assert!(data.iter().all(|t| t["priority"] == "high" && t["status"] == "in_progress"));
    assert!(data.iter().all(|t| t["employee_department"].is_string()));
    Ok(())
}

#[tokio::test]
async fn bad_paging_and_enum_values_are_rejected() -> Result<()> {
    let server = common::spawn_server().await?;

    for path in [
        "/api/employees?page=0",
        "/api/employees?limit=abc",
        "/api/employees?status=retired",
        "/api/tasks?employee_id=abc",
        "/api/tasks?priority=urgent",
    ] {
        let (status, body) = server.get_json(path).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert!(body["errors"].is_array(), "{}", path);
    }
    Ok(())
}

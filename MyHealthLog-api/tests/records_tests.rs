mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_medication_stock_runs_out() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, medication) = app
        .post(
            "/api/medications",
            &token,
            json!({ "name": "Ibuprofen", "dosage": "200mg", "stock": "3" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(medication["stock"], 3);
    let id = medication["id"].as_i64().unwrap();

    let (status, body) = app
        .post(&format!("/api/medications/{}/take", id), &token, json!({ "dosageAmount": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "服药记录成功");

    let (status, body) = app
        .post(&format!("/api/medications/{}/take", id), &token, json!({ "dosageAmount": 2 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "库存不足，当前剩余 1。");

    let (_, medications) = app.get("/api/medications", &token).await;
    assert_eq!(medications[0]["stock"], 1);

    let (status, logs) = app.get(&format!("/api/medications/{}/logs", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let log_id = logs[0]["id"].as_i64().unwrap();
    let uri = format!("/api/medications/logs/{}", log_id);
    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_medication_requires_a_name() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, body) = app.post("/api/medications", &token, json!({ "dosage": "1 tab" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "药品名称不能为空。");
}

#[tokio::test]
async fn test_records_are_private_to_their_owner() {
    let app = TestApp::new();
    let (_, alice) = app.login_as("alice").await;
    let (_, bob) = app.login_as("bob").await;

    let (_, medication) = app.post("/api/medications", &alice, json!({ "name": "Aspirin" })).await;
    let id = medication["id"].as_i64().unwrap();

    let (status, _) = app
        .put(&format!("/api/medications/{}", id), &bob, json!({ "name": "Stolen" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.delete(&format!("/api/medications/{}", id), &bob).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, theirs) = app.get("/api/medications", &bob).await;
    assert_eq!(theirs, json!([]));
    let (_, mine) = app.get("/api/medications", &alice).await;
    assert_eq!(mine[0]["name"], "Aspirin");
}

#[tokio::test]
async fn test_stool_summary_needs_a_range() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    for day in ["2024-05-01", "2024-05-01", "2024-05-03"] {
        let (status, _) = app
            .post("/api/stool", &token, json!({ "log_date": day, "stool_type": "4" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = app.get("/api/stool/summary?startDate=2024-05-01", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, summary) = app
        .get("/api/stool/summary?startDate=2024-05-01&endDate=2024-05-31", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({ "2024-05-01": 2, "2024-05-03": 1 }));

    let (_, dates) = app.get("/api/stool/dates", &token).await;
    assert_eq!(dates.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_daily_log_is_saved_once_per_item_and_day() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, item) = app
        .post("/api/daily-logs/items", &token, json!({ "item_name": "Stretch", "item_type": "daily" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["item_type"], "daily");

    let log = json!({ "log_date": "2024-05-01", "item_name": "Stretch", "status": "done" });
    let (status, first) = app.post("/api/daily-logs/logs", &token, log).await;
    assert_eq!(status, StatusCode::CREATED);

    let log = json!({ "log_date": "2024-05-01", "item_name": "Stretch", "status": "skipped", "notes": "rain" });
    let (status, second) = app.post("/api/daily-logs/logs", &token, log).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["id"], first["id"]);

    let (_, logs) = app.get("/api/daily-logs/logs/2024-05-01", &token).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["status"], "skipped");

    let (status, _) = app.get("/api/daily-logs/logs/May-first", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_item_type_must_be_known() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, _) = app
        .post("/api/daily-logs/items", &token, json!({ "item_name": "Nap", "item_type": "weekly" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exercise_date_and_id_share_a_segment() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    for (day, name) in [("2024-05-02", "Run"), ("2024-05-02", "Swim"), ("2024-05-20", "Run")] {
        let (status, _) = app
            .post(
                "/api/exercise",
                &token,
                json!({ "log_date": day, "exercise_name": name, "duration_minutes": 30 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, summary) = app.get("/api/exercise/summary/2024/5", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!(["2024-05-02", "2024-05-20"]));

    let (status, _) = app.get("/api/exercise/summary/2024/13", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, logs) = app.get("/api/exercise/2024-05-02", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 2);

    let id = logs[0]["id"].as_i64().unwrap();
    let (status, body) = app.delete(&format!("/api/exercise/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "运动记录删除成功");

    let (status, _) = app.delete(&format!("/api/exercise/{}", id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, left) = app.get("/api/exercise/search?startDate=2024-05-01&endDate=2024-05-31", &token).await;
    assert_eq!(left.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_path_segments_get_a_json_message() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, body) = app.delete("/api/exercise/abc", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "路径参数无效");

    let (status, body) = app.get("/api/exercise/summary/2024/x", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "路径参数无效");

    let (status, body) = app.put("/api/periods/first", &token, json!({ "notes": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "路径参数无效");
}

#[tokio::test]
async fn test_blank_memo_search_finds_nothing() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, memo) = app
        .post("/api/memos", &token, json!({ "task_name": "Buy milk", "priority": "high" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = memo["id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/api/memos/{}/status", id), &token, json!({ "is_completed": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "状态已更新");

    let (_, found) = app.get("/api/memos/history/search?q=milk", &token).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, found) = app.get("/api/memos/history/search?q=", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found, json!([]));

    let (status, _) = app.delete(&format!("/api/memos/{}", id), &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_period_prediction_and_update() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, prediction) = app.get("/api/periods/predict", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(prediction["message"].is_string());
    assert!(prediction["nextPeriodStartDate"].is_null());

    let (status, record) = app
        .post("/api/periods", &token, json!({ "start_date": "2024-05-01" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = record["id"].as_i64().unwrap();

    let (status, body) = app
        .put(&format!("/api/periods/{}", id), &token, json!({ "end_date": "2024-05-05" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "记录更新成功！");

    let (status, body) = app
        .put(&format!("/api/periods/{}", id), &token, json!({ "end_date": "2024-04-20" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "结束日期不能早于开始日期。");

    let (status, _) = app.put(&format!("/api/periods/{}", id), &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for blank in [json!({ "pain_level": "" }), json!({ "flow_volume": null })] {
        let (status, body) = app.put(&format!("/api/periods/{}", id), &token, blank).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "没有提供任何需要更新的信息。");
    }

    let (_, records) = app.get("/api/periods", &token).await;
    assert_eq!(records[0]["end_date"], "2024-05-05");
    assert_eq!(records[0]["pain_level"], record["pain_level"]);
    assert_eq!(records[0]["flow_volume"], record["flow_volume"]);
}

#[tokio::test]
async fn test_weight_must_be_positive() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, body) = app
        .post("/api/weight", &token, json!({ "weight": 0, "log_datetime": "2024-05-01T07:30" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "体重必须为正数");

    let (status, body) = app
        .post("/api/weight", &token, json!({ "weight": "61.5", "log_datetime": "2024-05-01T07:30" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "体重记录已保存");

    let (status, _) = app.put("/api/weight/height", &token, json!({ "height": 170 })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, overview) = app.get("/api/weight", &token).await;
    assert_eq!(overview["height"], 170.0);
    assert_eq!(overview["weights"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sex_log_is_one_per_day() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let (status, body) = app
        .post("/api/sex", &token, json!({ "log_date": "2024-05-01", "protection_method": "condom" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "记录成功！");

    let (status, body) = app
        .post("/api/sex", &token, json!({ "log_date": "2024-05-01", "protection_method": "none" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "记录已更新。");

    let (_, logs) = app.get("/api/sex", &token).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["protection_method"], "none");

    let (status, _) = app.delete("/api/sex/2024-05-01", &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete("/api/sex/2024-05-01", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

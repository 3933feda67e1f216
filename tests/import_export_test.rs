use std::io::Write;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use recruitment_tracker::{
    database::{CandidateRepository, InMemoryCandidateRepository, InMemoryJobRepository},
    error::Error,
    middleware::auth::issue_token,
    routes,
    services::import_service::{ImportOptions, ImportService},
    AppState, StoreKind,
};
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::NamedTempFile;
use tower::ServiceExt;

const SECRET: &str = "test_secret_key";

fn gbk_file(text: &str) -> NamedTempFile {
    let (bytes, _, had_errors) = encoding_rs::GBK.encode(text);
    assert!(!had_errors);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    file
}

const SAMPLE: &str = "姓名;城市;手机号码;本科学校;专业;学历;综合能力测评成绩;笔试成绩\n\
张三;北京;13800000000;北京大学;计算机科学;本科;85;90.5\n\
李四;上海;13900000000;复旦大学;数学;硕士;;\n";

#[tokio::test]
async fn gbk_file_imports_every_row_including_the_header() {
    let repo = Arc::new(InMemoryCandidateRepository::new());
    let service = ImportService::new(repo.clone());
    let file = gbk_file(SAMPLE);

    let report = service
        .import_file(file.path(), &ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(report.imported, 3);
    assert!(!report.skipped_header);

    let stored = repo.list().await.unwrap();
    assert_eq!(stored[0].fields.username, "姓名");
    assert_eq!(stored[0].fields.test_score_of_general_ability, None);

    let zhang = &stored[1];
    assert_eq!(zhang.fields.username, "张三");
    assert_eq!(zhang.fields.city, "北京");
    assert_eq!(zhang.fields.bachelor_school, "北京大学");
    assert_eq!(zhang.fields.major, "计算机科学");
    assert_eq!(zhang.fields.test_score_of_general_ability, Some(Decimal::new(85, 0)));
    assert_eq!(zhang.fields.paper_score, Some(Decimal::new(905, 1)));
    assert_eq!(zhang.creator, None);
    assert_eq!(zhang.last_editor, None);

    assert_eq!(stored[2].fields.paper_score, None);
}

#[tokio::test]
async fn skip_header_drops_only_the_first_row() {
    let repo = Arc::new(InMemoryCandidateRepository::new());
    let service = ImportService::new(repo.clone());
    let file = gbk_file(SAMPLE);

    let options = ImportOptions {
        skip_header: true,
        ..Default::default()
    };
    let report = service.import_file(file.path(), &options).await.unwrap();
    assert_eq!(report.imported, 2);
    assert!(report.skipped_header);
    assert_eq!(repo.list().await.unwrap()[0].fields.username, "张三");
}

#[tokio::test]
async fn short_row_stops_the_import_and_keeps_earlier_rows() {
    let repo = Arc::new(InMemoryCandidateRepository::new());
    let service = ImportService::new(repo.clone());
    let file = gbk_file("张三;北京;138;北大;计算机;本科;80;90\n王五;深圳;139\n赵六;北京;137;清华;物理;博士;70;60\n");

    let err = service
        .import_file(file.path(), &ImportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedRow { line: 2, found: 3, .. }));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn wrong_encoding_fails_before_any_row_is_stored() {
    let repo = Arc::new(InMemoryCandidateRepository::new());
    let service = ImportService::new(repo.clone());
    let file = gbk_file(SAMPLE);

    let options = ImportOptions {
        encoding: "utf-8".into(),
        ..Default::default()
    };
    let err = service.import_file(file.path(), &options).await.unwrap_err();
    assert!(matches!(err, Error::Encoding(_)));
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn export_returns_bom_prefixed_csv_attachment() {
    let candidates = Arc::new(InMemoryCandidateRepository::new());
    let app = routes::router(AppState::new(
        candidates.clone(),
        Arc::new(InMemoryJobRepository::new()),
        SECRET.to_string(),
        StoreKind::Memory,
    ));
    let report = ImportService::new(candidates)
        .import_text(
            "张三;北京;13800000000;北京大学;计算机;本科;85;90\n李四;上海;13900000000;复旦大学;数学;硕士;;\n",
            false,
        )
        .await
        .unwrap();
    let (zhang, li) = (report.candidate_ids[0], report.candidate_ids[1]);

    let token = issue_token(SECRET, "alice", "hr", 3600).unwrap();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/candidates/export")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "candidate_ids": [li, zhang] }).to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=recruitment-candidates-list-"));
    assert!(disposition.ends_with(".csv"));

    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let expected = "\u{feff}姓名,城市,手机号码,本科学校,研究生学校,学历,初试结果,初试面试官,专业复试结果,专业复试面试官,HR复试结果,HR面试官\r\n\
李四,上海,13900000000,复旦大学,,硕士,,,,,,\r\n\
张三,北京,13800000000,北京大学,,本科,,,,,,\r\n";
    assert_eq!(body.as_ref(), expected.as_bytes());
}

#[tokio::test]
async fn export_without_token_is_rejected() {
    let app = routes::router(AppState::in_memory(SECRET.to_string()));
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/candidates/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn exported_rows_import_back_with_the_shared_fields() {
    let source = Arc::new(InMemoryCandidateRepository::new());
    ImportService::new(source.clone())
        .import_text(
            "张三;北京;13800000000;北京大学;计算机;本科;85;90\n\"王, 五\";深圳;13700000000;中山大学;物理;博士;;\n",
            false,
        )
        .await
        .unwrap();
    let originals = source.list().await.unwrap();
    let csv_bytes =
        recruitment_tracker::services::export_service::ExportService::candidates_csv(&originals)
            .unwrap();

    // export columns: username, city, phone, bachelor_school, master_school, degree, ...
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(&csv_bytes[3..]);
    let mut rows = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(Vec::new());
    for record in reader.records() {
        let record = record.unwrap();
        rows.write_record([&record[0], &record[1], &record[2], &record[3], "", &record[5], "", ""])
            .unwrap();
    }
    let text = String::from_utf8(rows.into_inner().unwrap()).unwrap();

    let target = Arc::new(InMemoryCandidateRepository::new());
    let report = ImportService::new(target.clone())
        .import_text(&text, false)
        .await
        .unwrap();
    assert_eq!(report.imported, 2);

    for (before, after) in originals.iter().zip(target.list().await.unwrap()) {
        assert_eq!(after.fields.username, before.fields.username);
        assert_eq!(after.fields.city, before.fields.city);
        assert_eq!(after.fields.phone, before.fields.phone);
        assert_eq!(after.fields.bachelor_school, before.fields.bachelor_school);
        assert_eq!(after.fields.degree, before.fields.degree);
    }
}

use cartells_intake::clients::WebhookClient;
use cartells_intake::error::{AppError, FormError};
use cartells_intake::infrastructure::ObjectUrlRegistry;
use cartells_intake::models::{DocumentFile, DocumentSlot, FloodStatus};
use cartells_intake::{
    App, Config, FormField, ImageRef, IntakeSession, Step, SubmissionOrchestrator,
    SubmissionResult, GENERIC_FAILURE_MESSAGE,
};
use mockito::{Matcher, Server, ServerGuard};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::{assert_err, assert_ok};

const WEBHOOK_PATH: &str = "/webhook-test/cartells-check";
const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn config_for(server: &ServerGuard) -> Config {
    Config {
        webhook_url: format!("{}{}", server.url(), WEBHOOK_PATH),
        ..Config::default()
    }
}

fn session_for(config: &Config) -> (IntakeSession, ObjectUrlRegistry) {
    let client = WebhookClient::new(config).expect("webhook client");
    let registry = ObjectUrlRegistry::new();
    let orchestrator = SubmissionOrchestrator::new(client, registry.clone());
    (IntakeSession::new(orchestrator), registry)
}

/// 填好两步并停在最后一步
fn fill_form(session: &mut IntakeSession) {
    session.set_field(FormField::Document(
        DocumentSlot::RegistrationGap,
        Some(DocumentFile::new("gap.pdf", b"%PDF-1.4 gap".to_vec()).unwrap()),
    ));
    assert!(session.next());
    session.set_field(FormField::Mileage("52,000km".to_string()));
    session.set_field(FormField::AccidentDescription("앞범퍼 교체".to_string()));
    session.set_field(FormField::Flooded(FloodStatus::NotFlooded));
    session.set_field(FormField::ConditionNotes("엔진 소음".to_string()));
}

/// 读完一个完整的 HTTP 请求（头部 + 按 content-length 或 chunked 的请求体）
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let body = &buf[head_end + 4..];
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok());

        let complete = match content_length {
            Some(len) => body.len() >= len,
            None => body.ends_with(b"0\r\n\r\n"),
        };
        if complete {
            return;
        }
    }
}

#[tokio::test]
async fn loading_flag_is_set_while_request_is_pending() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let body = r#"{"imageUrl":"https://x/y.png"}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    let config = Config {
        webhook_url: format!("http://{}{}", addr, WEBHOOK_PATH),
        ..Config::default()
    };
    let client = WebhookClient::new(&config).expect("webhook client");
    let orchestrator = SubmissionOrchestrator::new(client, ObjectUrlRegistry::new());
    let flag = orchestrator.loading_flag().clone();
    let mut session = IntakeSession::new(orchestrator);
    fill_form(&mut session);
    assert!(!flag.is_loading());

    let observer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flag.is_loading()
    });

    let result = assert_ok!(session.submit().await).clone();
    assert!(observer.await.unwrap(), "提交进行中加载标志应为 true");
    assert!(!session.is_loading());
    assert_eq!(
        result,
        SubmissionResult::DisplayableImage(ImageRef::Remote("https://x/y.png".to_string()))
    );
    server.await.unwrap();
}

#[tokio::test]
async fn binary_image_response_is_registered() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", WEBHOOK_PATH)
        .match_header("ngrok-skip-browser-warning", "69420")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="current_mileage"\s+52000"#.to_string()),
            Matcher::Regex(r#"name="is_flooded"\s+false"#.to_string()),
            Matcher::Regex(r#"name="registrationGap"; filename="gap.pdf""#.to_string()),
            Matcher::Regex(
                r"(?s)current_mileage.*accident_desc.*is_flooded.*issue_details.*registrationGap"
                    .to_string(),
            ),
        ]))
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_BYTES)
        .expect(1)
        .create_async()
        .await;

    let (mut session, registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    mock.assert_async().await;

    let image = result.image().expect("displayable image");
    let url = image.transient().expect("transient handle");
    assert_eq!(registry.get(url).unwrap().bytes.as_slice(), &PNG_BYTES);
    assert!(session.is_result_visible());
    assert!(session.error_message().is_none());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn json_image_url_is_used_verbatim() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"imageUrl":"https://x/y.png"}"#)
        .create_async()
        .await;

    let (mut session, registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    assert_eq!(
        result,
        SubmissionResult::DisplayableImage(ImageRef::Remote("https://x/y.png".to_string()))
    );
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn json_base64_image_becomes_data_uri() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"image":"iVBORw0KGgo="}"#)
        .create_async()
        .await;

    let (mut session, _registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    let src = result.image().map(ImageRef::as_src).unwrap_or_default();
    assert!(src.starts_with("data:image/png;base64,"));

    let view = session.report_view(true);
    assert!(view.download().is_some());
    assert_eq!(view.share().map(|s| s.url), Some(src.to_string()));
}

#[tokio::test]
async fn server_error_yields_generic_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", WEBHOOK_PATH)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let (mut session, _registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    assert_eq!(result, SubmissionResult::Error(GENERIC_FAILURE_MESSAGE.to_string()));
    assert!(!session.is_loading());
    assert!(!session.is_result_visible());
    assert_eq!(session.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(session.report_view(true).download().is_none());
    // 失败后停留在表单，可以重新提交
    assert!(session.form().can_submit());
}

#[tokio::test]
async fn json_without_image_yields_generic_message() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"queued"}"#)
        .create_async()
        .await;

    let (mut session, _registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    assert_eq!(result.error_message(), Some(GENERIC_FAILURE_MESSAGE));
}

#[tokio::test]
async fn network_failure_yields_generic_message() {
    let config = Config {
        webhook_url: format!("http://127.0.0.1:1{}", WEBHOOK_PATH),
        ..Config::default()
    };
    let (mut session, _registry) = session_for(&config);
    fill_form(&mut session);

    let result = assert_ok!(session.submit().await).clone();
    assert!(result.is_error());
    assert!(!session.is_loading());
}

#[tokio::test]
async fn new_submission_releases_previous_image() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_BYTES)
        .expect(2)
        .create_async()
        .await;

    let (mut session, registry) = session_for(&config_for(&server));
    fill_form(&mut session);

    let first = assert_ok!(session.submit().await).clone();
    let first_url = first.image().and_then(ImageRef::transient).cloned().unwrap();

    let second = assert_ok!(session.submit().await).clone();
    let second_url = second.image().and_then(ImageRef::transient).cloned().unwrap();
    mock.assert_async().await;

    assert_ne!(first_url, second_url);
    assert!(!registry.is_live(&first_url));
    assert!(registry.is_live(&second_url));
    assert_eq!(registry.live_count(), 1);
}

#[tokio::test]
async fn dismiss_and_drop_release_handle_once() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body(PNG_BYTES)
        .expect(2)
        .create_async()
        .await;

    let config = config_for(&server);
    let (mut session, registry) = session_for(&config);
    fill_form(&mut session);

    assert_ok!(session.submit().await);
    assert_eq!(registry.live_count(), 1);

    session.dismiss_result();
    session.dismiss_result();
    assert_eq!(registry.live_count(), 0);
    assert!(!session.is_result_visible());
    assert!(session.result().is_none());

    assert_ok!(session.submit().await);
    assert_eq!(registry.live_count(), 1);
    drop(session);
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn incomplete_form_is_rejected_without_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", WEBHOOK_PATH)
        .expect(0)
        .create_async()
        .await;

    let (mut session, _registry) = session_for(&config_for(&server));
    session.set_field(FormField::Mileage("100".to_string()));
    session.set_field(FormField::Flooded(FloodStatus::Flooded));
    assert!(!session.next());

    let err = assert_err!(session.submit().await);
    assert!(matches!(
        err,
        AppError::Form(FormError::NotReady {
            current: Step::Documents
        })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn app_processes_intake_folder() {
    let dir = tempfile::tempdir().unwrap();
    let intake_dir = dir.path().join("intake");
    tokio::fs::create_dir_all(&intake_dir).await.unwrap();
    tokio::fs::write(intake_dir.join("gap.pdf"), b"%PDF-1.4 gap")
        .await
        .unwrap();
    tokio::fs::write(
        intake_dir.join("01_sonata.toml"),
        r#"
current_mileage = 52000
accident_desc = "앞범퍼 교체"
is_flooded = false
issue_details = ""
registration_gap = "gap.pdf"
"#,
    )
    .await
    .unwrap();
    // 缺少必填证件，应计为失败且不发请求
    tokio::fs::write(
        intake_dir.join("02_missing_gap.toml"),
        "current_mileage = 1000\nis_flooded = true\n",
    )
    .await
    .unwrap();

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", WEBHOOK_PATH)
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(PNG_BYTES)
        .expect(1)
        .create_async()
        .await;

    let report_dir = dir.path().join("reports");
    let config = Config {
        intake_folder: intake_dir.to_string_lossy().to_string(),
        report_dir: report_dir.to_string_lossy().to_string(),
        output_log_file: dir.path().join("output.txt").to_string_lossy().to_string(),
        ..config_for(&server)
    };

    let app = assert_ok!(App::initialize(config).await);
    let stats = assert_ok!(app.run().await);
    mock.assert_async().await;

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(&report_dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("Cartells_Appraisal_Report_") && names[0].ends_with(".html"));
    assert!(names[1].ends_with(".png"));

    let saved = tokio::fs::read(report_dir.join(&names[1])).await.unwrap();
    assert_eq!(saved, PNG_BYTES);
}

mod common;

use std::time::Duration;

use common::{
    calls, closes, connects, json_response, last_request, mock_config, respond_with, FakeTransport, StalledTransport,
};
use mock_server::Behavior;
use shitposts::{ApiError, EditJob, SessionConfig, ShitpostingSession};

#[tokio::test]
async fn never_entered_session_sends_nothing() {
    let session = ShitpostingSession::<FakeTransport>::owned(SessionConfig::default());
    assert!(!session.is_ready());

    assert!(matches!(session.user().await, Err(ApiError::SessionNotReady)));
    assert!(matches!(session.commands().await, Err(ApiError::SessionNotReady)));
    assert!(matches!(session.get_command("crop").await, Err(ApiError::SessionNotReady)));
    let job = EditJob::new().with("invert", Vec::<(String, String)>::new());
    assert!(matches!(
        session.edit(b"data", "image/png", &job).await,
        Err(ApiError::SessionNotReady)
    ));
    assert_eq!(calls(), 0);
    assert_eq!(connects(), 0);
}

#[tokio::test]
async fn exited_session_sends_nothing() {
    let mut session = ShitpostingSession::<FakeTransport>::owned(SessionConfig::default());
    session.enter().unwrap();
    session.commands().await.unwrap();
    session.exit();

    assert!(matches!(session.commands().await, Err(ApiError::SessionNotReady)));
    assert_eq!(calls(), 1);
    assert_eq!(closes(), 1);
}

#[tokio::test]
async fn scope_closes_owned_transport_once() {
    let mut session = ShitpostingSession::<FakeTransport>::owned(SessionConfig::default());
    {
        let scope = session.open().unwrap();
        assert!(scope.is_ready());
        let commands = scope.commands().await.unwrap();
        assert_eq!(commands[0].name, "crop");
    }
    assert_eq!(connects(), 1);
    assert_eq!(closes(), 1);

    // Exiting again is harmless.
    session.exit();
    assert_eq!(closes(), 1);
}

#[tokio::test]
async fn reentry_creates_a_fresh_transport() {
    let mut session = ShitpostingSession::<FakeTransport>::owned(SessionConfig::default());
    session.enter().unwrap();
    session.enter().unwrap();
    assert_eq!(connects(), 1);
    session.exit();

    let scope = session.open().unwrap();
    scope.user().await.ok();
    drop(scope);
    assert_eq!(connects(), 2);
    assert_eq!(closes(), 2);
}

#[tokio::test]
async fn borrowed_transport_is_gated_and_never_closed() {
    let transport = FakeTransport;
    let mut session = ShitpostingSession::with_transport(SessionConfig::default(), &transport);
    assert!(session.is_borrowed());
    assert!(matches!(session.commands().await, Err(ApiError::SessionNotReady)));

    {
        let scope = session.open().unwrap();
        scope.commands().await.unwrap();
    }
    assert!(matches!(session.commands().await, Err(ApiError::SessionNotReady)));
    assert_eq!(calls(), 1);
    assert_eq!(connects(), 0);
    assert_eq!(closes(), 0);
}

#[tokio::test]
async fn edit_sends_directives_in_order() {
    respond_with(json_response(200, "edited"));
    let mut session = ShitpostingSession::<FakeTransport>::owned(SessionConfig::default());
    let scope = session.open().unwrap();

    let edited = scope
        .edit_with(
            b"\x89PNG",
            "image/png",
            [
                ("crop", vec![("x", "1")]),
                ("caption", vec![("text", "when the")]),
                ("invert", vec![]),
            ],
        )
        .await
        .unwrap();
    assert_eq!(edited, b"edited");

    let request = last_request().unwrap();
    assert!(request.url.ends_with("/edit"));
    assert!(request.header("content-type").unwrap().starts_with("multipart/form-data; boundary="));
    let body = String::from_utf8_lossy(request.body.as_deref().unwrap()).into_owned();
    let crop = body.find(r#"{"name":"crop""#).unwrap();
    let caption = body.find(r#"{"name":"caption""#).unwrap();
    let invert = body.find(r#"{"name":"invert""#).unwrap();
    assert!(crop < caption && caption < invert);
}

#[tokio::test]
async fn mock_server_round_trip() {
    let mut session = ShitpostingSession::new(mock_config(Behavior::default()));
    let scope = session.open().unwrap();

    let names: Vec<String> = scope.commands().await.unwrap().into_iter().map(|c| c.name).collect();
    assert!(names.iter().any(|name| name == "crop"));

    let caption = scope.get_command("caption").await.unwrap();
    assert_eq!(caption.parameters[0]["name"], "text");

    let err = scope.get_command("does/not exist").await.unwrap_err();
    assert!(matches!(err, ApiError::RemoteFailure { status: 404, .. }));

    let media = b"GIF89a-not-really".to_vec();
    let job = EditJob::new().with("rotate", [("degrees", "90")]);
    assert_eq!(scope.edit(&media, "image/gif", &job).await.unwrap(), media);

    let stats = scope.user().await.unwrap();
    assert_eq!(stats["edits"], 1);
}

#[tokio::test]
async fn rejected_edit_is_a_remote_failure() {
    let mut session = ShitpostingSession::new(mock_config(Behavior::default()));
    let scope = session.open().unwrap();

    let job = EditJob::new().with("explode", [("power", "9000")]);
    let err = scope.edit(b"data", "image/png", &job).await.unwrap_err();
    match err {
        ApiError::RemoteFailure { status, reason, body } => {
            assert_eq!(status, 400);
            assert_eq!(reason, "Bad Request");
            assert!(body.contains("unknown command: explode"));
        }
        other => panic!("expected RemoteFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_is_reported_without_decoding() {
    let mut session = ShitpostingSession::new(mock_config(Behavior {
        rate_limited: true,
        ..Behavior::default()
    }));
    let scope = session.open().unwrap();

    let err = scope.user().await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(err.status(), Some(429));
    assert!(err.response().unwrap().text().contains("slow down"));
}

#[tokio::test]
async fn missing_commands_field_is_unrecognized() {
    let mut session = ShitpostingSession::new(mock_config(Behavior {
        omit_commands_field: true,
        ..Behavior::default()
    }));
    let scope = session.open().unwrap();

    let err = scope.commands().await.unwrap_err();
    assert!(matches!(err, ApiError::UnrecognizedPayload { missing: "commands", .. }));
    assert_eq!(err.response().unwrap().body, b"{}");
}

#[tokio::test]
async fn borrowed_reqwest_client_outlives_session() {
    let config = mock_config(Behavior::default());
    let endpoint = config.endpoint.clone();
    let client = reqwest::Client::new();
    {
        let mut session = ShitpostingSession::with_transport(config, &client);
        let scope = session.open().unwrap();
        scope.commands().await.unwrap();
    }

    let response = client.get(format!("{endpoint}commands")).send().await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let config = SessionConfig::default().with_endpoint(format!("http://{addr}/v1/"));
    let mut session = ShitpostingSession::new(config);
    let scope = session.open().unwrap();

    let err = scope.user().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn cancelled_operation_still_closes_transport() {
    let mut session = ShitpostingSession::<StalledTransport>::owned(SessionConfig::default());

    let outcome = tokio::time::timeout(Duration::from_millis(50), async {
        let scope = session.open().unwrap();
        scope.user().await
    })
    .await;

    assert!(outcome.is_err());
    assert_eq!(connects(), 1);
    assert_eq!(closes(), 1);
    assert!(!session.is_ready());
}

#[tokio::test]
async fn sub_second_timeout_still_completes_requests() {
    let config = mock_config(Behavior::default()).with_timeout(Duration::from_millis(500));
    let mut session = ShitpostingSession::new(config);
    let scope = session.open().unwrap();

    assert!(scope.user().await.is_ok());
}

use std::time::Duration;

use ezdiffusion_client::{ApiSettings, DiffusionApi, ReqwestDiffusionApi, Transport};
use ezdiffusion_core::{
    GenerationMode, GenerationParameters, ImageToImageParams, InpaintParams, OpStatus,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestDiffusionApi {
    ReqwestDiffusionApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("client")
}

fn accepted_body(job_id: &str) -> serde_json::Value {
    json!({"job_id": job_id, "status": "QUEUED"})
}

async fn mount_generate(server: &MockServer, transport: Transport, job_id: &str) {
    Mock::given(method("POST"))
        .and(path(transport.path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted_body(job_id)))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn text_mode_routes_to_text_to_image() {
    let server = MockServer::start().await;
    mount_generate(&server, Transport::TextToImage, "t2i").await;

    let params = GenerationParameters {
        prompt: "a cat".to_string(),
        ..GenerationParameters::default()
    };
    let accepted = api_for(&server).submit_generation(&params).await.expect("submit");

    assert_eq!(accepted.job_id, "t2i");
    assert_eq!(accepted.status, OpStatus::Queued);
    assert_eq!(accepted.result, None);
}

#[tokio::test]
async fn image_reference_without_mask_routes_to_image_to_image() {
    let server = MockServer::start().await;
    mount_generate(&server, Transport::ImageToImage, "i2i").await;

    let params = GenerationParameters {
        prompt: "a cat".to_string(),
        mode: GenerationMode::resolve(
            Some(ImageToImageParams {
                starting_image: "https://example.com/start.png".to_string(),
            }),
            None,
        ),
        ..GenerationParameters::default()
    };
    let accepted = api_for(&server).submit_generation(&params).await.expect("submit");
    assert_eq!(accepted.job_id, "i2i");
}

#[tokio::test]
async fn image_reference_and_mask_still_route_to_image_to_image() {
    let server = MockServer::start().await;
    mount_generate(&server, Transport::ImageToImage, "i2i").await;
    Mock::given(method("POST"))
        .and(path(Transport::Inpaint.path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted_body("inpaint")))
        .expect(0)
        .mount(&server)
        .await;

    let params = GenerationParameters {
        prompt: "a cat".to_string(),
        mode: GenerationMode::resolve(
            Some(ImageToImageParams {
                starting_image: "https://example.com/start.png".to_string(),
            }),
            Some(InpaintParams {
                starting_image: "https://example.com/start.png".to_string(),
                mask_image: "https://example.com/mask.png".to_string(),
                use_controlnet_union_inpaint: false,
            }),
        ),
        ..GenerationParameters::default()
    };
    let accepted = api_for(&server).submit_generation(&params).await.expect("submit");
    assert_eq!(accepted.job_id, "i2i");
}

#[tokio::test]
async fn inpaint_mode_routes_to_inpaint_and_sends_mask() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(Transport::Inpaint.path()))
        .and(body_partial_json(json!({
            "input": {
                "prompt": "a cat",
                "inpaint": {"mask_image": "data:image/png;base64,MASK"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted_body("inpaint")))
        .expect(1)
        .mount(&server)
        .await;

    let params = GenerationParameters {
        prompt: "a cat".to_string(),
        mode: GenerationMode::Inpaint {
            starting_image: "data:image/png;base64,START".to_string(),
            mask_image: "data:image/png;base64,MASK".to_string(),
            use_controlnet_union_inpaint: false,
        },
        ..GenerationParameters::default()
    };
    let accepted = api_for(&server).submit_generation(&params).await.expect("submit");
    assert_eq!(accepted.job_id, "inpaint");
}

#[tokio::test]
async fn non_success_status_becomes_generic_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(Transport::TextToImage.path()))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .submit_generation(&GenerationParameters::default())
        .await
        .unwrap_err();
    assert!(err.message.contains("503"), "{}", err.message);
    assert!(err.message.contains("overloaded"), "{}", err.message);
}

#[tokio::test]
async fn malformed_payload_becomes_generic_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = api_for(&server).fetch_history(0, 10).await.unwrap_err();
    assert!(err.message.starts_with("malformed response"), "{}", err.message);
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/system/memory"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"device": "cuda"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestDiffusionApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .expect("client");
    let err = api.fetch_memory_info().await.unwrap_err();
    assert!(err.message.contains("timed out"), "{}", err.message);
}

#[tokio::test]
async fn unreachable_server_becomes_generic_error() {
    let api = ReqwestDiffusionApi::new(ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(500),
    })
    .expect("client");

    let err = api
        .submit_generation(&GenerationParameters::default())
        .await
        .unwrap_err();
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn history_fetch_sends_window_and_maps_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/history"))
        .and(query_param("index", "0"))
        .and(query_param("length", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "job_id": "j2",
                    "status": "SUCCESS",
                    "progress": 1.0,
                    "input": {"prompt": "a cat", "dimensions": {"width": 512, "height": 512}},
                    "result": {"source": "https://cdn.example.com/j2.png"}
                },
                {"job_id": "j1", "status": "FAILURE"}
            ]
        })))
        .mount(&server)
        .await;

    let entries = api_for(&server).fetch_history(0, 10).await.expect("history");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].job_id, "j2");
    assert_eq!(entries[0].input.prompt, "a cat");
    assert_eq!(entries[0].input.dimensions.width, 512);
    assert_eq!(
        entries[0].result.as_ref().map(|r| r.source.as_str()),
        Some("https://cdn.example.com/j2.png")
    );
    assert_eq!(entries[1].status, OpStatus::Failure);
    assert_eq!(entries[1].progress, 0.0);
}

#[tokio::test]
async fn memory_info_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/system/memory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device": "mps",
            "allocated_mb": 2048.0,
            "driver_allocated_mb": 4096.0
        })))
        .mount(&server)
        .await;

    let info = api_for(&server).fetch_memory_info().await.expect("memory");
    assert_eq!(info.device.as_deref(), Some("mps"));
    assert_eq!(info.allocated_mb, Some(2048.0));
    assert!(info.to_string().contains("driver_allocated_mb=4096.0"));
}

#[tokio::test]
async fn invalid_base_url_is_reported_without_network() {
    let api = ReqwestDiffusionApi::new(ApiSettings {
        base_url: "not a url".to_string(),
        ..ApiSettings::default()
    })
    .expect("client");

    let err = api.fetch_history(0, 10).await.unwrap_err();
    assert!(err.message.starts_with("invalid url"), "{}", err.message);
}

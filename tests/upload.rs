//! Drives the router in-process with a fake analyzer, covering the end-to-end request contract.

use std::{path::Path, sync::Arc};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use narigudo::face::expression::Expressions;
use narigudo::face::{Face, FaceAnalysis};
use narigudo::image::{Image, Rect};
use narigudo::landmark::Landmarks;
use narigudo::pipeline::CANONICAL_RESOLUTION;
use narigudo::server::{router, App};
use narigudo::storage::Storage;

const BOUNDARY: &str = "narigudo-test-boundary";

/// A canned analyzer: reports faces with fixed nose anchors, or fails outright.
struct Fake {
    anchors: Vec<[f32; 2]>,
    fail: bool,
}

impl FaceAnalysis for Fake {
    fn analyze(&self, _image: &Image) -> anyhow::Result<Vec<Face>> {
        if self.fail {
            anyhow::bail!("detector exploded");
        }
        Ok(self
            .anchors
            .iter()
            .map(|&anchor| {
                let mut landmarks = Landmarks::new();
                landmarks.positions_mut()[27] = anchor;
                Face::new(
                    Rect::from_center(anchor[0], anchor[1], 120.0, 120.0),
                    landmarks,
                    Expressions::from_scores([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
                )
            })
            .collect())
    }
}

fn test_router(fake: Fake, label: &str) -> axum::Router {
    let dir = std::env::temp_dir().join(format!("narigudo-e2e-{label}-{}", std::process::id()));
    let storage = Storage::create(dir).unwrap();
    let app = Arc::new(App {
        analyzer: Arc::new(fake),
        storage,
    });
    router(app, Path::new("public"), 10 * 1024 * 1024)
}

fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn sample_photo(width: u32, height: u32) -> Vec<u8> {
    let mut img = Image::new(width, height);
    img.clear(narigudo::image::Color::from_rgb8(180, 160, 140));
    img.encode_png().unwrap()
}

#[tokio::test]
async fn upload_without_face_returns_canonical_png() {
    let app = test_router(
        Fake {
            anchors: vec![],
            fail: false,
        },
        "nofac",
    );

    let body = multipart_body("image", "photo.png", "image/png", &sample_photo(500, 500));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let output = Image::decode(&bytes).unwrap();
    assert_eq!(output.resolution(), CANONICAL_RESOLUTION);
}

#[tokio::test]
async fn oversized_upload_is_normalized() {
    let app = test_router(
        Fake {
            anchors: vec![[250.0, 230.0]],
            fail: false,
        },
        "norm",
    );

    let body = multipart_body("image", "big.png", "image/png", &sample_photo(2000, 1000));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let output = Image::decode(&bytes).unwrap();
    assert_eq!(output.resolution(), CANONICAL_RESOLUTION);
}

#[tokio::test]
async fn non_image_upload_is_rejected_and_server_stays_up() {
    let app = test_router(
        Fake {
            anchors: vec![],
            fail: false,
        },
        "badimg",
    );

    let body = multipart_body("image", "notes.jpg", "image/jpeg", b"just some text");
    let response = app.clone().oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], "imagem inválida ou corrompida".as_bytes());

    // The failure must not poison the service for the next request.
    let body = multipart_body("image", "photo.png", "image/png", &sample_photo(100, 100));
    let response = app.oneshot(upload_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_image_field_is_bad_request() {
    let app = test_router(
        Fake {
            anchors: vec![],
            fail: false,
        },
        "nofield",
    );

    let body = multipart_body("attachment", "photo.png", "image/png", &sample_photo(10, 10));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], "nenhuma imagem enviada".as_bytes());
}

#[tokio::test]
async fn concurrent_uploads_do_not_bleed_into_each_other() {
    let app = test_router(
        Fake {
            anchors: vec![],
            fail: false,
        },
        "concurrent",
    );

    let mut red = Image::new(300, 300);
    red.clear(narigudo::image::Color::from_rgb8(220, 10, 10));
    let mut blue = Image::new(300, 300);
    blue.clear(narigudo::image::Color::from_rgb8(10, 10, 220));

    let red_req = upload_request(multipart_body(
        "image",
        "red.png",
        "image/png",
        &red.encode_png().unwrap(),
    ));
    let blue_req = upload_request(multipart_body(
        "image",
        "blue.png",
        "image/png",
        &blue.encode_png().unwrap(),
    ));

    let (red_res, blue_res) =
        tokio::join!(app.clone().oneshot(red_req), app.oneshot(blue_req));

    let mut outputs = Vec::new();
    for response in [red_res.unwrap(), blue_res.unwrap()] {
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        outputs.push(Image::decode(&bytes).unwrap());
    }

    // Each output must be dominated by its own input's color; the 25 decorative shapes are not
    // enough to flip the balance.
    let channel_sums = |img: &Image| {
        let (mut r, mut b) = (0u64, 0u64);
        for y in 0..img.height() {
            for x in 0..img.width() {
                let c = img.get(x, y);
                r += u64::from(c.r());
                b += u64::from(c.b());
            }
        }
        (r, b)
    };
    let (r, b) = channel_sums(&outputs[0]);
    assert!(r > b, "red upload came back blue-ish");
    let (r, b) = channel_sums(&outputs[1]);
    assert!(b > r, "blue upload came back red-ish");
}

#[tokio::test]
async fn analyzer_failure_is_an_internal_error() {
    let app = test_router(
        Fake {
            anchors: vec![],
            fail: true,
        },
        "fail",
    );

    let body = multipart_body("image", "photo.png", "image/png", &sample_photo(50, 50));
    let response = app.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], "Erro ao processar a imagem".as_bytes());
}

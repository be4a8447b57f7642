use crate::config::Config;
use crate::scanner::Scanner;
use crate::structs::{ScanFailure, ScanOutcome};
use crate::upload::UploadedPhoto;
use actix_cors::Cors;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::web::{Data, ServiceConfig};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, post};
use serde::Serialize;

/// Upload form shared by the scan and tag routes.
#[derive(MultipartForm)]
pub struct PhotoForm {
    photo: Option<TempFile>,
}

impl PhotoForm {
    fn into_photo(self) -> Option<UploadedPhoto> {
        self.photo.map(|upload| {
            UploadedPhoto::from_temp_file(upload.file, upload.size).with_file_name(upload.file_name)
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: error.into(),
            details,
        }
    }
}

fn upload_failed(error: &actix_web::Error) -> HttpResponse {
    tracing::error!(error = %error, "upload failed");
    HttpResponse::InternalServerError().json(ErrorBody::new("Upload failed", Some(error.to_string())))
}

fn failure_response(failure: ScanFailure) -> HttpResponse {
    let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let details = if status.is_server_error() {
        failure.details
    } else {
        None
    };
    HttpResponse::build(status).json(ErrorBody::new(failure.message, details))
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json("healthy")
}

#[post("/api/scan")]
async fn scan(
    scanner: Data<Scanner>,
    form: Result<MultipartForm<PhotoForm>, actix_web::Error>,
) -> HttpResponse {
    let photo = match form {
        Ok(MultipartForm(form)) => form.into_photo(),
        Err(e) => return upload_failed(&e),
    };

    match scanner.scan(photo).await {
        ScanOutcome::Success(success) => HttpResponse::Ok().json(success),
        ScanOutcome::Failure(failure) => failure_response(failure),
    }
}

#[post("/exif/exif-parsed")]
async fn exif_parsed(
    scanner: Data<Scanner>,
    form: Result<MultipartForm<PhotoForm>, actix_web::Error>,
) -> HttpResponse {
    let photo = match form {
        Ok(MultipartForm(form)) => form.into_photo(),
        Err(e) => return upload_failed(&e),
    };
    let Some(photo) = photo else {
        return HttpResponse::BadRequest().json(ErrorBody::new("No file uploaded", None));
    };

    match scanner.extract_tags(Some(photo)).await {
        Ok(tags) => HttpResponse::Ok().json(serde_json::json!({ "tags": tags })),
        Err(e) => {
            tracing::error!(error = %e, details = e.details().unwrap_or_default(), "tag extraction failed");
            HttpResponse::InternalServerError()
                .json(ErrorBody::new("Failed to read EXIF", e.details()))
        }
    }
}

/// Registers every route. Expects a `Data<Scanner>` in the app data.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(health).service(scan).service(exif_parsed);
}

/// Serves the scanner over HTTP until the server is stopped.
pub async fn run(config: &Config, scanner: Scanner) -> std::io::Result<()> {
    let scanner = Data::new(scanner);
    let upload_limit = config.max_upload_bytes;
    let addr = (config.host.clone(), config.port);

    tracing::info!(
        host = %config.host,
        port = config.port,
        mode = ?scanner.mode(),
        "starting building scanner"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(Data::clone(&scanner))
            .app_data(MultipartFormConfig::default().total_limit(upload_limit))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind(addr)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::metadata::ExifExtractor;
    use crate::test_support::{Reply, StubExtractor, StubIdentifier, gps_tags};
    use actix_web::http::header;
    use actix_web::test;
    use serde_json::{Value, json};

    const BOUNDARY: &str = "----building-scanner-test";

    fn multipart_body(field: &str, contents: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(uri: &str, field: &str, contents: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(field, contents))
    }

    fn stub_scanner(identifier: StubIdentifier) -> Scanner {
        Scanner::builder()
            .extractor(Box::new(StubExtractor::new(gps_tags())))
            .identifier(Box::new(identifier))
            .build()
    }

    async fn call(scanner: Scanner, request: test::TestRequest) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(scanner))
                .configure(configure),
        )
        .await;
        let response = test::call_service(&app, request.to_request()).await;
        let status = response.status();
        (status, test::read_body_json(response).await)
    }

    #[actix_web::test]
    async fn test_scan_returns_building() {
        let scanner = stub_scanner(StubIdentifier::replying(r#"{"name": "Flatiron Building"}"#));

        let (status, body) = call(scanner, upload("/api/scan", "photo", b"jpeg")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["latitude"], json!(40.5));
        assert_eq!(body["building"]["name"], json!("Flatiron Building"));
        assert!(body.get("error").is_none());
    }

    #[actix_web::test]
    async fn test_scan_without_photo_field() {
        let scanner = stub_scanner(StubIdentifier::replying("{}"));

        let (status, body) = call(scanner, upload("/api/scan", "picture", b"jpeg")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded (field name: photo)"}));
    }

    #[actix_web::test]
    async fn test_scan_of_non_image_is_server_error() {
        let scanner = Scanner::builder()
            .extractor(Box::new(ExifExtractor))
            .identifier(Box::new(StubIdentifier::replying("{}")))
            .build();

        let (status, body) = call(scanner, upload("/api/scan", "photo", b"plain text")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Failed to parse EXIF or read file"));
        assert!(body["details"].is_string());
    }

    #[actix_web::test]
    async fn test_scan_service_failure() {
        let scanner = stub_scanner(StubIdentifier::new(Reply::Fail));

        let (status, body) = call(scanner, upload("/api/scan", "photo", b"jpeg")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            json!("Failed to fetch building info from the identification service")
        );
    }

    #[actix_web::test]
    async fn test_scan_of_unparseable_body_is_upload_failure() {
        let scanner = stub_scanner(StubIdentifier::replying("{}"));
        let request = test::TestRequest::post()
            .uri("/api/scan")
            .insert_header((header::CONTENT_TYPE, "multipart/form-data"))
            .set_payload("not multipart");

        let (status, body) = call(scanner, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Upload failed"));
    }

    #[actix_web::test]
    async fn test_exif_parsed_returns_tags() {
        let scanner = stub_scanner(StubIdentifier::replying("{}"));

        let (status, body) = call(scanner, upload("/exif/exif-parsed", "photo", b"jpeg")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tags"]["GPSLatitudeRef"], json!("N"));
    }

    #[actix_web::test]
    async fn test_exif_parsed_without_photo() {
        let scanner = stub_scanner(StubIdentifier::replying("{}"));

        let (status, body) = call(scanner, upload("/exif/exif-parsed", "other", b"jpeg")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No file uploaded"}));
    }

    #[actix_web::test]
    async fn test_health() {
        let scanner = stub_scanner(StubIdentifier::replying("{}"));

        let (status, body) = call(scanner, test::TestRequest::get().uri("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("healthy"));
    }
}

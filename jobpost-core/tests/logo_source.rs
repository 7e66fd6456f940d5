//! HTTP logo source against a local server

use std::io::Cursor;
use std::sync::Once;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use jobpost_core::logo::LogoError;
use jobpost_core::{placeholder_logo, HttpLogoSource, LogoSource};
use tiny_http::{Response, Server};

static INIT: Once = Once::new();
const ADDR: &str = "127.0.0.1:18093";

fn red_square_png() -> Vec<u8> {
    let img = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Start a logo server: /acme.com serves a PNG, /garbage.com serves junk, everything else 404s
fn start_logo_server() -> String {
    INIT.call_once(|| {
        let server = Server::http(ADDR).unwrap();
        std::thread::spawn(move || {
            let png = red_square_png();
            for request in server.incoming_requests() {
                let response = match request.url() {
                    "/acme.com" => Response::from_data(png.clone()),
                    "/garbage.com" => Response::from_data(b"definitely not an image".to_vec()),
                    _ => Response::from_data(b"Not Found".to_vec()).with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
    });

    format!("http://{ADDR}")
}

fn source() -> HttpLogoSource {
    HttpLogoSource::new(start_logo_server(), Duration::from_secs(2)).unwrap()
}

#[test]
fn test_fetch_decodes_served_png() {
    let logo = source().fetch("ACME");
    assert_eq!(logo.dimensions(), (8, 8));
    assert_eq!(*logo.get_pixel(3, 3), Rgba([255, 0, 0, 255]));
}

#[test]
fn test_not_found_yields_placeholder() {
    assert_eq!(source().fetch("Unknown Corp"), placeholder_logo());
}

#[test]
fn test_undecodable_body_yields_placeholder() {
    assert_eq!(source().fetch("Garbage"), placeholder_logo());
}

#[test]
fn test_fetch_url_reports_status() {
    let source = source();
    let err = source.fetch_url(&source.logo_url("Unknown Corp")).unwrap_err();
    match err {
        LogoError::Status(status) => assert_eq!(status.as_u16(), 404),
        other => panic!("expected a status error, got {other:?}"),
    }
}

#[test]
fn test_fetch_url_reports_decode_failure() {
    let source = source();
    let err = source.fetch_url(&source.logo_url("Garbage")).unwrap_err();
    assert!(matches!(err, LogoError::Decode(_)), "{err:?}");
}

#[test]
fn test_fetch_url_decodes_served_png() {
    let source = source();
    let logo = source.fetch_url(&source.logo_url("ACME")).unwrap();
    assert_eq!(logo.dimensions(), (8, 8));
}

//! Shared helpers for integration tests

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server};
use vizreg_vision::{CaptureError, Renderer, ScreenshotTarget};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub fn encode(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    encode(&RgbaImage::from_pixel(width, height, color))
}

/// White image with a black `size`x`size` square at `(x, y)`
pub fn png_with_block(width: u32, height: u32, x: u32, y: u32, size: u32) -> Vec<u8> {
    let mut image = RgbaImage::from_pixel(width, height, WHITE);
    for px in x..x + size {
        for py in y..y + size {
            image.put_pixel(px, py, BLACK);
        }
    }
    encode(&image)
}

/// Serves canned PNGs by target name
#[derive(Default)]
pub struct StaticRenderer {
    pages: HashMap<String, Vec<u8>>,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, name: &str, png: Vec<u8>) -> Self {
        self.pages.insert(name.to_string(), png);
        self
    }
}

impl Renderer for StaticRenderer {
    fn capture(&self, target: &ScreenshotTarget) -> Result<Vec<u8>, CaptureError> {
        Ok(self
            .pages
            .get(&target.name)
            .cloned()
            .unwrap_or_else(|| panic!("no page for {}", target.name)))
    }
}

/// What the disposable server saw
#[derive(Debug)]
pub struct SeenRequest {
    pub url: String,
    pub api_key: Option<String>,
}

/// Start a server that answers exactly one request with `status` and `body`
///
/// Returns the base URL and a channel yielding the request it received.
pub fn serve_once(
    status: u16,
    body: Vec<u8>,
    content_type: &str,
) -> (String, mpsc::Receiver<SeenRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = Server::from_listener(listener, None).unwrap();
    let content_type =
        Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()).unwrap();

    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok(Some(request)) = server.recv_timeout(Duration::from_secs(30)) {
            let api_key = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("X-KEY"))
                .map(|h| h.value.as_str().to_string());

            let _ = tx.send(SeenRequest {
                url: request.url().to_string(),
                api_key,
            });

            let response = Response::from_data(body)
                .with_status_code(status)
                .with_header(content_type);
            let _ = request.respond(response);
        }
    });

    (format!("http://127.0.0.1:{}", port), rx)
}

//! Page and image fixtures mounted on a wiremock server

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Small but valid-looking JPEG payload
pub const TEST_IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Page body linking `image_url` through an image_src link
pub fn image_page(image_url: &str) -> String {
    format!(
        "<!doctype html>\n<html><head>\n<title>photo</title>\n\
         <link rel=\"image_src\" href=\"{}\">\n</head>\n<body><p>hello</p></body></html>",
        image_url
    )
}

/// Serve a page at `page_path` linking an image at `image_path`
pub async fn mount_gallery_item(
    server: &MockServer,
    page_path: &str,
    image_path: &str,
    bytes: &[u8],
) {
    let image_url = format!("{}{}", server.uri(), image_path);
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(image_page(&image_url)))
        .mount(server)
        .await;
    mount_image(server, image_path, bytes).await;
}

/// Serve raw image bytes at `image_path`
pub async fn mount_image(server: &MockServer, image_path: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(image_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

/// Serve `body` with status 200 at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

/// Answer every direct request for `page_path` with `status`
pub async fn mount_status(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Make the proxy answer for `target_url` with `body`, expecting exactly `calls` requests
pub async fn mount_proxy_page(server: &MockServer, target_url: &str, body: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/proxy/"))
        .and(query_param("quest", target_url))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(calls)
        .mount(server)
        .await;
}

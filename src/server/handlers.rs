use hyper::{
    header::{self, HeaderValue},
    http, Method, Request, Response, StatusCode,
};
use log::{error, info, warn};
use tokio::fs::File;

use super::{
    body::{empty, full, FileBody, ResponseBody},
    media_type::MediaType,
};
use crate::{
    models::ErrorBody,
    service::BootService,
    utils::{percent_decode, Json, API_PREFIX},
    Error,
};

/// Endpoints of the API, with the raw (still percent-encoded) parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route<'a> {
    /// `/api/v1/boot/{mac-addr}`
    Boot(&'a str),
    /// `/api/v1/static/{resource:*}`
    Static(&'a str),
}

impl<'a> Route<'a> {
    pub(crate) fn parse(path: &'a str) -> Option<Self> {
        let rest = path.strip_prefix(API_PREFIX)?;
        if let Some(mac) = rest.strip_prefix("/boot/") {
            if mac.is_empty() || mac.contains('/') {
                return None;
            }
            return Some(Route::Boot(mac));
        }
        match rest.strip_prefix("/static/") {
            Some(resource) if !resource.is_empty() => Some(Route::Static(resource)),
            _ => None,
        }
    }
}

/// Entry point for every request. Never fails: lookup errors become
/// 4xx/5xx responses here and never reach the connection.
pub async fn handle<B>(service: &BootService, req: Request<B>) -> Response<ResponseBody> {
    let path = req.uri().path();
    let route = match Route::parse(path) {
        Some(route) => route,
        None => {
            warn!("no route for {} {path}", req.method());
            return error_response(StatusCode::NOT_FOUND, format!("no route for {path}"));
        }
    };

    let head = match *req.method() {
        Method::GET => false,
        Method::HEAD => true,
        _ => {
            warn!("method {} not allowed on {path}", req.method());
            let mut res =
                error_response(StatusCode::METHOD_NOT_ALLOWED, "only GET and HEAD are allowed");
            res.headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
            return res;
        }
    };

    let res = match route {
        Route::Boot(mac) => handle_boot_request(service, mac),
        Route::Static(resource) => handle_resource_request(service, resource, head).await,
    };
    if head {
        let (parts, _) = res.into_parts();
        return Response::from_parts(parts, empty());
    }
    res
}

/// Answers the chainloader with the boot descriptor of `mac`.
fn handle_boot_request(service: &BootService, mac: &str) -> Response<ResponseBody> {
    info!("Received pixiecore request...");
    let mac = match percent_decode(mac) {
        Some(mac) => mac,
        None => return error_response(StatusCode::BAD_REQUEST, format!("malformed mac address {mac}")),
    };
    let descriptor = match service.boot_descriptor(&mac) {
        Ok(descriptor) => descriptor,
        Err(e) => return error_from(e),
    };
    match descriptor.into_json() {
        Ok(json) => json_response(StatusCode::OK, json),
        Err(e) => error_from(Error::from(e)),
    }
}

/// Streams the repository file named by `resource`.
async fn handle_resource_request(
    service: &BootService,
    resource: &str,
    head: bool,
) -> Response<ResponseBody> {
    info!("Received resource request...");
    let resource = match percent_decode(resource) {
        Some(resource) => resource,
        None => {
            return error_response(StatusCode::BAD_REQUEST, format!("malformed resource path {resource}"))
        }
    };
    let path = match service.resource(&resource).await {
        Ok(path) => path,
        Err(e) => return error_from(e),
    };

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return error_from(Error::ResourceNotFound(service.resources().root().join(&resource)))
        }
        Err(e) => return error_from(Error::from(e)),
    };
    let len = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => return error_from(Error::from(e)),
    };

    // HEAD only needs the headers, don't bother wrapping the file
    let body = if head {
        empty()
    } else {
        FileBody::new(file, len).boxed()
    };
    respond(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, MediaType::from_path(&resource).as_str())
            .header(header::CONTENT_LENGTH, len),
        body,
    )
}

fn json_response(status: StatusCode, json: String) -> Response<ResponseBody> {
    respond(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, MediaType::ApplicationJson.as_str())
            .header(header::CONTENT_LENGTH, json.len()),
        full(json),
    )
}

fn error_from(e: Error) -> Response<ResponseBody> {
    if !e.is_not_found() {
        error!("request failed: {e}");
    }
    error_response(e.status(), e.to_string())
}

fn error_response<S: Into<String>>(status: StatusCode, msg: S) -> Response<ResponseBody> {
    match ErrorBody::new(msg).into_json() {
        Ok(json) => json_response(status, json),
        Err(e) => {
            error!("encoding error body: {e}");
            bare(status)
        }
    }
}

fn respond(builder: http::response::Builder, body: ResponseBody) -> Response<ResponseBody> {
    builder.body(body).unwrap_or_else(|e| {
        error!("building response: {e}");
        bare(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

fn bare(status: StatusCode) -> Response<ResponseBody> {
    let mut res = Response::new(empty());
    *res.status_mut() = status;
    res
}

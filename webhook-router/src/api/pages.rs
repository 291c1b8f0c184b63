use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use shared::http::html_response;

const INDEX: &str = include_str!("../../templates/index.html");
const LOGIN: &str = include_str!("../../templates/login.html");
const SIGNUP: &str = include_str!("../../templates/signup.html");
const OP_GRID: &str = include_str!("../../templates/op_grid.html");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Index,
    Login,
    Signup,
    OpGrid,
}

pub fn render(page: Page) -> Response<Bytes> {
    let html = match page {
        Page::Index => INDEX,
        Page::Login => LOGIN,
        Page::Signup => SIGNUP,
        Page::OpGrid => OP_GRID,
    };
    html_response(StatusCode::OK, html)
}

/// `<pre>` listing of the registered routes, one per line.
pub fn endpoints(lines: &[String]) -> Response<Bytes> {
    html_response(StatusCode::OK, format!("<pre>{}</pre>", lines.join("\n")))
}

use axum::{body::Body, response::Response};
use maud::Markup;
use scraper::{Html, Selector};

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

pub(crate) async fn parse_html_fragment(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_fragment(&text)
}

pub(crate) fn parse_html(markup: Markup) -> Html {
    Html::parse_fragment(&markup.into_string())
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn assert_alert_success(html: &Html, message: &str) {
    assert_alert(html, message, "text-green-800");
}

#[track_caller]
pub(crate) fn assert_alert_error(html: &Html, message: &str) {
    assert_alert(html, message, "text-red-800");
}

#[track_caller]
fn assert_alert(html: &Html, message: &str, class: &str) {
    let selector = Selector::parse(&format!("[role='alert'].{class}")).unwrap();
    let alert = html
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("No alert found with class {class}"));
    let text = alert.text().collect::<String>();

    assert!(
        text.contains(message),
        "want alert containing \"{message}\", got \"{}\"",
        text.trim()
    );
}

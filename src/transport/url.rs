use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::options::RequestOptions;

/// Characters left alone by URI component encoding
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// `<endpoint>gid=<gid>&tq=<query>`, plus `&tqx=responseHandler:<name>` when
/// the response should be wrapped in a callback invocation.
pub fn request_url(request: &RequestOptions, callback: Option<&str>) -> String {
    let mut url = format!(
        "{}gid={}&tq={}",
        request.endpoint,
        encode_component(&request.gid),
        encode_component(&request.query)
    );

    if let Some(name) = callback {
        url.push_str("&tqx=responseHandler:");
        url.push_str(name);
    }

    url
}

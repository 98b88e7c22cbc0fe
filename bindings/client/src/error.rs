/// Describe a failure to complete an HTTP exchange, for recording against a status `0` result.
///
/// The kind of failure is put first so that failures can be told apart at a glance in reports.
pub fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_builder() {
        "invalid request"
    } else if err.is_body() || err.is_decode() {
        "response body error"
    } else {
        "request failed"
    };

    format!("{kind}: {err}")
}

//! Sign-in redirect location

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use timeout_api::SignOutReason;

/// Characters a URI component keeps as-is; everything else is escaped,
/// including `/`, `?`, `&` and space (`%20`, never `+`)
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

/// `<sign_in_path>?next=<next>&status=<flag>`, relative to the site.
/// The status is omitted for a user sign-out.
pub fn sign_in_location(sign_in_path: &str, next: &str, reason: SignOutReason) -> String {
    let next = utf8_percent_encode(next, COMPONENT);
    match reason.status_flag() {
        Some(status) => format!("{sign_in_path}?next={next}&status={status}"),
        None => format!("{sign_in_path}?next={next}"),
    }
}

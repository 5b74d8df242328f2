use crate::url::Address;

/// Returns true when both addresses name the same host
///
/// Scheme and port are ignored, so `http://site.test/` and
/// `https://site.test:8443/` belong to the same site.
pub fn is_same_host(a: &Address, b: &Address) -> bool {
    a.host().eq_ignore_ascii_case(b.host())
}

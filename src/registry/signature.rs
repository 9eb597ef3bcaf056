use sha2::{Digest, Sha256};

use crate::handler::{REQUEST_PARAM, RESPONSE_PARAM};

/// Lookup key for a method overload.
pub type SignatureHash = u64;

/// Hash of a method name and its full parameter-name set.
///
/// Each name is digested independently (first eight bytes of SHA-256) and the
/// digests are summed with wrapping arithmetic. The sum is commutative, so the
/// order parameters are listed in, or arguments arrive in, never matters. Types
/// and values do not take part.
///
/// Distinct name sets can in principle collide (a method `a` taking `b` hashes
/// like a method `b` taking `a`). The router accepts that risk rather than
/// comparing full parameter lists on every request.
pub fn signature_hash<'a, I>(method: &str, parameter_names: I) -> SignatureHash
where
    I: IntoIterator<Item = &'a str>,
{
    parameter_names
        .into_iter()
        .fold(name_digest(method), |acc, name| {
            acc.wrapping_add(name_digest(name))
        })
}

/// Hash for an incoming call: the method name, the fixed request/response pair,
/// and every argument key supplied by the path.
pub fn request_signature<'a, I>(method: &str, argument_keys: I) -> SignatureHash
where
    I: IntoIterator<Item = &'a str>,
{
    signature_hash(
        method,
        [REQUEST_PARAM, RESPONSE_PARAM].into_iter().chain(argument_keys),
    )
}

fn name_digest(name: &str) -> u64 {
    Sha256::digest(name.as_bytes())
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

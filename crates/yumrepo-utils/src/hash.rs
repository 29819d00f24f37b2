/// Computes the hex-encoded digest of a string.
///
/// The digest is stable across runs and platforms, which makes it suitable for deriving
/// on-disk names from arbitrary input such as URLs. The default implementation uses the
/// `blake3` crate.
///
/// # Example
///
/// ```
/// use yumrepo_utils::hash::digest_hex;
///
/// let key = digest_hex("http://mirror.centos.org/centos/6/os/x86_64");
/// assert_eq!(key.len(), 64);
/// ```
pub fn digest_hex(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

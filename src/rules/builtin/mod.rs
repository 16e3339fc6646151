mod android;
mod code;
mod crypto;
mod dependencies;
mod ios;
mod network;
mod secrets;
mod storage;

use super::Rule;

/// Extensions for JS/TS source rules.
pub(crate) const CODE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

/// Extensions for text rules that also cover JSON configuration.
pub(crate) const CODE_AND_CONFIG_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "json"];

/// All built-in rules, in registration order. Selection preserves this
/// order; rules must not depend on it.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        // crypto
        Box::new(crypto::HardcodedEncryptionKey),
        Box::new(crypto::WeakHashAlgorithm),
        Box::new(crypto::InsecureRandom),
        // secrets
        Box::new(secrets::HardcodedSecret),
        Box::new(secrets::HardcodedJwt),
        Box::new(secrets::PrivateKeyPem),
        // network
        Box::new(network::InsecureHttpUrl),
        Box::new(network::WeakTlsVersion),
        Box::new(network::SslVerificationDisabled),
        // code
        Box::new(code::EvalUsage),
        Box::new(code::DangerousInnerHtml),
        Box::new(code::WebViewJavascriptEnabled),
        Box::new(code::SqlStringConcat),
        Box::new(code::ConsoleLogSensitive),
        // storage
        Box::new(storage::InsecureStorageSensitive),
        Box::new(storage::SensitiveDataInCookie),
        // android manifest
        Box::new(android::CleartextTrafficEnabled),
        Box::new(android::Debuggable),
        Box::new(android::AllowBackup),
        Box::new(android::ExportedComponent),
        // ios plist
        Box::new(ios::AtsDisabled),
        Box::new(ios::HttpExceptionDomain),
        Box::new(ios::FileSharingEnabled),
        // dependencies
        Box::new(dependencies::VulnerableDependency),
    ]
}

/// 1-based line/column of a byte offset in `content`.
pub(crate) fn line_col_of_offset(content: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(content.len());
    let prefix = &content[..clamped];
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    (line, clamped - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_to_line_col() {
        let content = "abc\ndef\nghi";
        assert_eq!(line_col_of_offset(content, 0), (1, 1));
        assert_eq!(line_col_of_offset(content, 4), (2, 1));
        assert_eq!(line_col_of_offset(content, 6), (2, 3));
        assert_eq!(line_col_of_offset(content, 8), (3, 1));
    }
}

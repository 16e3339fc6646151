use crate::context::RuleContext;
use crate::error::Result;
use crate::heuristics;
use crate::patterns::{self, thresholds};
use crate::rules::{Finding, Rule, RuleMetadata, Severity};

use super::CODE_EXTENSIONS;

/// HARDCODED_ENCRYPTION_KEY: a string literal bound to a key/IV-looking
/// name, longer than 20 characters and not shaped like an identifier.
pub struct HardcodedEncryptionKey;

impl Rule for HardcodedEncryptionKey {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "HARDCODED_ENCRYPTION_KEY",
            description: "Cryptographic key or IV material hardcoded in source",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "crypto",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(vec![]);
        };

        let mut findings = Vec::new();
        for lit in &syntax.string_literals {
            let Some(binding) = &lit.binding else {
                continue;
            };
            if !heuristics::is_key_material_name(binding) {
                continue;
            }
            if lit.value.len() <= thresholds::KEY_MATERIAL_MIN_LEN {
                continue;
            }
            if heuristics::looks_like_identifier(&lit.value) {
                continue;
            }
            findings.push(
                Finding::at_line(
                    "HARDCODED_ENCRYPTION_KEY",
                    Severity::High,
                    format!("Hardcoded encryption key material in '{binding}'"),
                    ctx.path.clone(),
                    lit.line,
                    lit.column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, lit.line, 1))
                .with_suggestion(
                    "Derive keys at runtime or load them from the platform keystore \
                     (Keychain / Android Keystore); never ship key material in the bundle.",
                ),
            );
        }
        Ok(findings)
    }
}

/// WEAK_HASH_ALGORITHM: calls into broken digest algorithms, either as a
/// banned receiver/method pair (CryptoJS.MD5) or a createHash argument.
pub struct WeakHashAlgorithm;

impl WeakHashAlgorithm {
    /// The algorithm a call commits to, if it is a weak one.
    fn weak_algorithm(callee: &str, method: &str, first_arg: Option<&str>) -> Option<String> {
        let lower = method.to_lowercase();
        if patterns::WEAK_HASH_ALGORITHMS.contains(&lower.as_str()) {
            return Some(method.to_uppercase());
        }
        if callee.ends_with("createHash") {
            let arg = first_arg.unwrap_or("").to_lowercase();
            for algo in patterns::WEAK_HASH_ALGORITHMS {
                if arg.contains(algo) {
                    return Some(algo.to_uppercase());
                }
            }
        }
        None
    }
}

impl Rule for WeakHashAlgorithm {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "WEAK_HASH_ALGORITHM",
            description: "Broken hash algorithm (MD5/SHA1/RC4) used",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "crypto",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(vec![]);
        };

        let mut findings = Vec::new();
        for call in &syntax.calls {
            let Some(algo) =
                Self::weak_algorithm(&call.callee, &call.method, call.first_arg.as_deref())
            else {
                continue;
            };
            findings.push(
                Finding::at_line(
                    "WEAK_HASH_ALGORITHM",
                    Severity::High,
                    format!("Weak hash algorithm {algo} in call to '{}'", call.callee),
                    ctx.path.clone(),
                    call.line,
                    call.column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, call.line, 1))
                .with_suggestion("Use SHA-256 or stronger; for passwords use bcrypt/scrypt/argon2."),
            );
        }
        Ok(findings)
    }
}

/// INSECURE_RANDOM: `Math.random()` in a security-sensitive spot. Gated on
/// both sides: security vocabulary must appear near the call (or in the
/// enclosing function's name) and no benign vocabulary may.
pub struct InsecureRandom;

impl Rule for InsecureRandom {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "INSECURE_RANDOM",
            description: "Math.random() used for a security-sensitive value",
            severity: Severity::High,
            extensions: CODE_EXTENSIONS,
            group: "crypto",
        }
    }

    fn check(&self, ctx: &RuleContext) -> Result<Vec<Finding>> {
        let Some(syntax) = &ctx.syntax else {
            return Ok(vec![]);
        };

        let mut findings = Vec::new();
        for call in &syntax.calls {
            if call.callee != "Math.random" {
                continue;
            }

            // The enclosing function's name is the strongest signal; the
            // surrounding text only decides when the name says nothing.
            let fn_name = call.enclosing_function.as_deref().unwrap_or("");
            let fn_positive = heuristics::has_security_context(fn_name);
            let fn_negative = heuristics::has_benign_context(fn_name);

            let fires = if fn_positive || fn_negative {
                fn_positive && !fn_negative
            } else {
                let window = heuristics::context_window(
                    &ctx.content,
                    call.byte_offset,
                    thresholds::CONTEXT_WINDOW_RADIUS,
                );
                heuristics::has_security_context(window)
                    && !heuristics::has_benign_context(window)
            };
            if !fires {
                continue;
            }

            findings.push(
                Finding::at_line(
                    "INSECURE_RANDOM",
                    Severity::High,
                    format!(
                        "Math.random() used in security-sensitive context{}",
                        call.enclosing_function
                            .as_deref()
                            .map(|f| format!(" (in '{f}')"))
                            .unwrap_or_default()
                    ),
                    ctx.path.clone(),
                    call.line,
                    call.column,
                )
                .with_snippet(heuristics::snippet_around(&ctx.content, call.line, 1))
                .with_suggestion(
                    "Use a CSPRNG: crypto.getRandomValues() or \
                     react-native-get-random-values.",
                ),
            );
        }
        Ok(findings)
    }
}

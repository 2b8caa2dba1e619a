// ---------------------------------------------------------------------------
// Backend selection — runtime capability probe over archmage tokens.
// ---------------------------------------------------------------------------

use core::fmt;

#[cfg(target_arch = "aarch64")]
use archmage::Arm64V2Token;
use archmage::SimdToken;
#[cfg(target_arch = "x86_64")]
use archmage::X64V3Token;

/// Which implementation family runs an operation.
///
/// Every backend produces byte-identical output for identical inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Portable per-pixel loops. Always available.
    Scalar,
    /// 256-bit AVX2 kernels (x86-64-v3).
    WideX86,
    /// 128-bit NEON kernels (AArch64).
    WideArm,
}

impl Backend {
    /// Every backend, fastest first.
    pub const ALL: [Backend; 3] = [Backend::WideX86, Backend::WideArm, Backend::Scalar];

    /// The fastest backend the running CPU supports.
    ///
    /// This probes the CPU rather than the compile target: an x86-64 machine
    /// without AVX2 gets [`Backend::Scalar`]. archmage caches the probe, so
    /// repeated calls are cheap. Tokens disabled through archmage are
    /// reported as unsupported.
    pub fn detect() -> Backend {
        let backend = Backend::ALL
            .into_iter()
            .find(|b| b.is_supported())
            .unwrap_or(Backend::Scalar);
        log::debug!("rgbablit: selected {backend} backend");
        backend
    }

    /// Whether this backend can execute on the running CPU.
    pub fn is_supported(self) -> bool {
        match self {
            Backend::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Backend::WideX86 => X64V3Token::summon().is_some(),
            #[cfg(target_arch = "aarch64")]
            Backend::WideArm => Arm64V2Token::summon().is_some(),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Backends supported on the running CPU, fastest first. Always ends
    /// with [`Backend::Scalar`].
    pub fn available() -> impl Iterator<Item = Backend> {
        Backend::ALL.into_iter().filter(|b| b.is_supported())
    }

    /// Short lowercase name, matching the variant suffixes (`avx2`, `neon`).
    pub const fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::WideX86 => "avx2",
            Backend::WideArm => "neon",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archmage::testing::{CompileTimePolicy, for_each_token_permutation};

    #[test]
    fn scalar_is_always_supported() {
        assert!(Backend::Scalar.is_supported());
        assert_eq!(Backend::available().last(), Some(Backend::Scalar));
    }

    #[test]
    fn detect_picks_first_available() {
        // Serialized with the dispatch tests that disable tokens.
        let _ = for_each_token_permutation(CompileTimePolicy::WarnStderr, |perm| {
            let first = Backend::available().next().unwrap();
            assert_eq!(Backend::detect(), first, "tier={perm}");
        });
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    #[test]
    fn other_architectures_fall_back_to_scalar() {
        assert_eq!(Backend::detect(), Backend::Scalar);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn neon_never_supported_on_x86() {
        assert!(!Backend::WideArm.is_supported());
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn avx2_never_supported_on_arm() {
        assert!(!Backend::WideX86.is_supported());
    }

    #[test]
    fn names() {
        use alloc::string::ToString;
        assert_eq!(Backend::Scalar.to_string(), "scalar");
        assert_eq!(Backend::WideX86.to_string(), "avx2");
        assert_eq!(Backend::WideArm.to_string(), "neon");
    }
}

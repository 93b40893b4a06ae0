//! [`RedirectTarget`] definitions.

use derive_more::{AsRef, Display, Into};

/// Relative path a client is sent back to after authentication.
///
/// Only same-origin paths pass validation, so a [`RedirectTarget`] can never
/// send a client to a foreign host.
#[derive(AsRef, Clone, Debug, Display, Eq, Into, PartialEq)]
#[as_ref(str, String)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// [`RedirectTarget`] used when the requested one is absent or unsafe.
    pub const FALLBACK: &'static str = "/";

    /// Sanitizes the given `target` into a [`RedirectTarget`].
    ///
    /// Anything that could leave the current origin (absolute URLs,
    /// protocol-relative URLs, path traversal, embedded NUL) collapses to
    /// [`RedirectTarget::FALLBACK`].
    #[must_use]
    pub fn sanitize(target: Option<&str>) -> Self {
        let fallback = || Self(Self::FALLBACK.into());

        let Some(target) = target else {
            return fallback();
        };
        let ok = target.starts_with('/')
            && !target.starts_with("//")
            && !target.contains("://")
            && !target.contains("..")
            && !target.contains('\0');
        if ok {
            Self(target.into())
        } else {
            fallback()
        }
    }
}

#[cfg(test)]
mod spec {
    use super::RedirectTarget;

    #[test]
    fn keeps_same_origin_paths() {
        for target in ["/", "/battle", "/ranking?page=2", "/a/b#top"] {
            let sanitized = RedirectTarget::sanitize(Some(target));
            assert_eq!(AsRef::<str>::as_ref(&sanitized), target);
        }
    }

    #[test]
    fn collapses_unsafe_targets_to_fallback() {
        for target in [
            "https://evil.example.com/",
            "//evil.example.com",
            "relative/path",
            "/up/../../etc/passwd",
            "/nul\0byte",
            "",
        ] {
            let sanitized = RedirectTarget::sanitize(Some(target));
            assert_eq!(
                AsRef::<str>::as_ref(&sanitized),
                RedirectTarget::FALLBACK,
                "kept `{target}`",
            );
        }
    }

    #[test]
    fn absent_target_falls_back() {
        let sanitized = RedirectTarget::sanitize(None);
        assert_eq!(AsRef::<str>::as_ref(&sanitized), RedirectTarget::FALLBACK);
    }
}

//! Picking the current version out of a repository's tags.

use std::cmp::Ordering;

use tracing::{debug, instrument, warn};

use super::{Version, compare};

/// Return the highest-precedence version among `tags`.
///
/// Tags that do not parse are logged and skipped. Among tags of equal
/// precedence (say `v1.0.0` and `1.0.0+ci.3`) the first one seen wins. With
/// no parseable tag at all the baseline [`Version::zero`] is returned.
#[instrument(skip_all)]
pub fn select_latest<I, S>(tags: I) -> Version
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut latest: Option<Version> = None;
    let mut skipped = 0usize;

    for tag in tags {
        let tag = tag.as_ref();
        let candidate = match Version::parse(tag) {
            Ok(version) => version,
            Err(err) => {
                warn!(%tag, reason = %err, "skipping tag that is not a version");
                skipped += 1;
                continue;
            }
        };

        let newer = latest
            .as_ref()
            .is_none_or(|current| compare(&candidate, current) == Ordering::Greater);
        if newer {
            latest = Some(candidate);
        }
    }

    let latest = latest.unwrap_or_else(Version::zero);
    debug!(%latest, skipped, "selected latest version");
    latest
}

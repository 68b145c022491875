use super::{Identifier, Version, VersionError, VersionResult};

/// Parse `[prefix]MAJOR.MINOR.PATCH[-PRE][+BUILD]`.
///
/// The prefix is everything before the first ASCII digit. The remainder
/// follows the semver.org grammar: no leading zeros in the numeric core or in
/// numeric pre-release identifiers, and identifiers limited to `[0-9A-Za-z-]`.
pub(super) fn parse(input: &str) -> VersionResult<Version> {
    let invalid = |reason: &'static str| VersionError::InvalidFormat {
        input: input.to_string(),
        reason,
    };

    let start = input
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| invalid("missing MAJOR.MINOR.PATCH"))?;
    let (prefix, rest) = input.split_at(start);

    let (rest, build) = match rest.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (rest, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut parts = core.split('.');
    let (Some(major), Some(minor), Some(patch), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected MAJOR.MINOR.PATCH"));
    };

    let pre_release = match pre {
        Some(pre) => pre
            .split('.')
            .map(parse_pre_release_identifier)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?,
        None => Vec::new(),
    };

    if let Some(build) = build {
        for id in build.split('.') {
            check_identifier(id, "empty build identifier", "invalid character in build metadata")
                .map_err(invalid)?;
        }
    }

    Ok(Version {
        prefix: Some(prefix.to_string()).filter(|p| !p.is_empty()),
        major: parse_numeric(major).map_err(invalid)?,
        minor: parse_numeric(minor).map_err(invalid)?,
        patch: parse_numeric(patch).map_err(invalid)?,
        pre_release,
        build: build.map(str::to_string),
    })
}

fn parse_numeric(part: &str) -> Result<u64, &'static str> {
    if part.is_empty() {
        return Err("empty numeric component");
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err("non-numeric version component");
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err("leading zero in numeric component");
    }
    part.parse().map_err(|_| "numeric component too large")
}

fn parse_pre_release_identifier(id: &str) -> Result<Identifier, &'static str> {
    check_identifier(
        id,
        "empty pre-release identifier",
        "invalid character in pre-release identifier",
    )?;
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Identifier::AlphaNumeric(id.to_string()));
    }
    if id.len() > 1 && id.starts_with('0') {
        return Err("leading zero in numeric pre-release identifier");
    }
    id.parse()
        .map(Identifier::Numeric)
        .map_err(|_| "numeric pre-release identifier too large")
}

fn check_identifier(
    id: &str,
    empty: &'static str,
    bad_char: &'static str,
) -> Result<(), &'static str> {
    if id.is_empty() {
        return Err(empty);
    }
    if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        return Err(bad_char);
    }
    Ok(())
}

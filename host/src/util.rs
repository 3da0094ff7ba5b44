use std::fs;
use std::ops::Range;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

/// A seed in decimal or `0x` hex, surrounding whitespace ignored.
pub fn parse_seed(text: &str) -> Result<u32> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => text.parse(),
    };
    parsed.with_context(|| format!("not a seed: {text:?}"))
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("{seed:#010x}")
}

fn parse_range(token: &str) -> Result<Range<u32>> {
    let (start, end) = token
        .split_once("..")
        .ok_or_else(|| anyhow!("not a seed range: {token:?}"))?;
    let range = parse_seed(start)?..parse_seed(end)?;
    if range.is_empty() {
        bail!("empty seed range: {token}");
    }
    Ok(range)
}

/// Expand seed tokens, where `start..end` is a half-open range, into one list.
fn collect_seeds<'a>(tokens: impl Iterator<Item = &'a str>, source: &str) -> Result<Vec<u32>> {
    let mut seeds = Vec::new();
    for token in tokens.map(str::trim).filter(|token| !token.is_empty()) {
        if token.contains("..") {
            seeds.extend(parse_range(token)?);
        } else {
            seeds.push(parse_seed(token)?);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds in {source}");
    }
    Ok(seeds)
}

/// Comma-separated seeds and ranges, as passed to `--seeds`.
pub fn parse_seed_csv(input: &str) -> Result<Vec<u32>> {
    collect_seeds(input.split(','), "--seeds")
}

/// One seed or range per line; `#` starts a comment line.
pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    let lines = data.lines().filter(|line| !line.trim_start().starts_with('#'));
    collect_seeds(lines, &path.display().to_string())
}

/// `count` consecutive seeds from `start`, wrapping at `u32::MAX`.
pub fn seed_span(start: u32, count: u32) -> Vec<u32> {
    (0..count).map(|offset| start.wrapping_add(offset)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parse_as_hex_or_decimal() {
        assert_eq!(parse_seed("0x2A").expect("hex"), 42);
        assert_eq!(parse_seed(" 42 ").expect("decimal"), 42);
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0xZZ").is_err());
        assert_eq!(seed_to_hex(42), "0x0000002a");
    }

    #[test]
    fn seed_lists_expand_ranges() {
        assert_eq!(
            parse_seed_csv("1, 0x10..0x13,7").expect("seed list"),
            vec![1, 16, 17, 18, 7]
        );
        assert!(parse_seed_csv("5..5").is_err());
        assert!(parse_seed_csv(" , ").is_err());
        assert_eq!(seed_span(u32::MAX, 2), vec![u32::MAX, 0]);
    }

    #[test]
    fn seed_files_skip_comments_and_blank_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("seeds.txt");
        fs::write(&path, "# night batch\n3\n\n0x20..0x22\n  # trailing\n").expect("write");
        assert_eq!(parse_seed_file(&path).expect("seed file"), vec![3, 32, 33]);

        fs::write(&path, "# nothing here\n").expect("write");
        assert!(parse_seed_file(&path).is_err());
    }
}

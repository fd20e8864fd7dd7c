//! 어노테이션 추출
//!
//! `access-marker="id"` 위치를 먼저 모두 찾고, 각 위치마다 같은 줄 안의
//! 제한된 구간에서만 `access-description` / `access-down` 값을 찾는다.
//!
//! 구간 규칙:
//! - 앞으로: id 바로 뒤부터 같은 줄의 다음 id 직전(또는 줄 끝)까지
//! - 뒤로: 그 줄의 첫 번째 id만, 줄 시작부터 id 직전까지
//!
//! 앞 구간에서 찾은 값이 우선한다.

use accessmap_foundation::MarkerRecord;
use regex::{Captures, Regex};
use std::path::Path;

lazy_static::lazy_static! {
    static ref MARKER_RE: Regex = attribute_regex("access-marker");
    static ref DESCRIPTION_RE: Regex = attribute_regex("access-description");
    static ref PARENT_RE: Regex = attribute_regex("access-down");
}

/// `key="value"` 또는 `key='value'`
fn attribute_regex(key: &str) -> Regex {
    let pattern = format!(
        r#"(?:^|[^\w-]){}\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
        regex::escape(key)
    );
    Regex::new(&pattern).expect("attribute pattern is a valid regex")
}

fn captured_value<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// 줄 안에서 찾은 id 위치
struct MarkerHit<'t> {
    id: &'t str,
    start: usize,
    end: usize,
}

fn marker_hits(line: &str) -> Vec<MarkerHit<'_>> {
    MARKER_RE
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let id = captured_value(&caps)?.trim();
            Some(MarkerHit {
                id,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// 구간 안의 첫 번째 값
fn first_value<'t>(re: &Regex, window: &'t str) -> Option<&'t str> {
    re.captures(window).and_then(|caps| captured_value(&caps))
}

/// 구간 안의 마지막 값
fn last_value<'t>(re: &Regex, window: &'t str) -> Option<&'t str> {
    re.captures_iter(window)
        .last()
        .and_then(|caps| captured_value(&caps))
}

fn lookup<'t>(re: &Regex, forward: &'t str, leading: &'t str) -> Option<String> {
    first_value(re, forward)
        .or_else(|| last_value(re, leading))
        .map(|v| v.to_string())
}

/// 한 줄에서 레코드 추출 (빈 id는 건너뜀)
pub fn extract_line(line: &str) -> Vec<MarkerRecord> {
    let hits = marker_hits(line);
    let mut records = Vec::with_capacity(hits.len());

    for (index, hit) in hits.iter().enumerate() {
        if hit.id.is_empty() {
            continue;
        }
        let forward_end = hits.get(index + 1).map(|next| next.start).unwrap_or(line.len());
        let forward = &line[hit.end..forward_end.max(hit.end)];
        let leading = if index == 0 { &line[..hit.start] } else { "" };

        let mut record = MarkerRecord::new(hit.id);
        record.description = lookup(&DESCRIPTION_RE, forward, leading);
        record.parent_ref = lookup(&PARENT_RE, forward, leading);
        records.push(record);
    }

    records
}

/// 텍스트 전체에서 레코드 추출 (등장 순서 유지)
pub fn extract_text(text: &str, source: Option<&Path>) -> Vec<MarkerRecord> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if !line.contains("access-marker") {
            continue;
        }
        for mut record in extract_line(line) {
            if let Some(path) = source {
                record = record.located(path, index + 1);
            }
            records.push(record);
        }
    }
    records
}

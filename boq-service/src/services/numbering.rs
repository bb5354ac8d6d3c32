//! Sequential document numbering.
//!
//! Numbers follow the pattern `BOQ-YYYYMMDD-NNNN`: today's date stamp
//! plus a 4-digit zero-padded sequence. The next number is derived from
//! the set of existing numbers, so two callers working from the same
//! snapshot can propose the same value; uniqueness is ultimately
//! enforced by the store's constraint on (company_id, number), not here.

use chrono::{DateTime, Timelike, Utc};

pub const NUMBER_PREFIX: &str = "BOQ";

/// Next document number for the current date.
pub fn next_number(existing: &[String]) -> String {
    next_number_at(existing, Utc::now())
}

/// Deterministic given its inputs. Takes the maximum sequence among
/// existing numbers bearing `now`'s date stamp and adds one, starting at
/// 0001 when none match. When the input set is non-empty but nothing in
/// it parses, falls back to a seconds-of-day suffix so the proposal
/// stays unique under degraded input.
pub fn next_number_at(existing: &[String], now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y%m%d").to_string();

    let mut any_valid = false;
    let mut max_sequence: u32 = 0;
    for number in existing {
        let Some((date_part, sequence_part)) = parse_number(number) else {
            continue;
        };
        any_valid = true;
        if date_part == stamp {
            if let Ok(sequence) = sequence_part.parse::<u32>() {
                max_sequence = max_sequence.max(sequence);
            }
        }
    }

    if !existing.is_empty() && !any_valid {
        return format!(
            "{}-{}-{:05}",
            NUMBER_PREFIX,
            stamp,
            now.time().num_seconds_from_midnight()
        );
    }

    format!("{}-{}-{:04}", NUMBER_PREFIX, stamp, max_sequence + 1)
}

/// Split a `BOQ-YYYYMMDD-NNNN` number into date stamp and sequence.
fn parse_number(number: &str) -> Option<(&str, &str)> {
    let rest = number.strip_prefix(NUMBER_PREFIX)?.strip_prefix('-')?;
    let (date_part, sequence_part) = rest.split_once('-')?;
    let date_ok = date_part.len() == 8 && date_part.bytes().all(|b| b.is_ascii_digit());
    let sequence_ok =
        !sequence_part.is_empty() && sequence_part.bytes().all(|b| b.is_ascii_digit());
    if date_ok && sequence_ok {
        Some((date_part, sequence_part))
    } else {
        None
    }
}

//! Turns raw iCal text into logical property lines

/// Unfold a raw iCal document.
///
/// Physical lines are split on CRLF or LF. A line starting with a single space or tab continues the previous
/// logical line: the marker character is dropped and the rest is appended as-is.
/// If the very first line is a continuation, there is nothing to fold it into and it is kept verbatim.
pub fn unfold(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for physical in content.split('\n') {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        if physical.is_empty() {
            continue;
        }

        let is_continuation = physical.starts_with(' ') || physical.starts_with('\t');
        match lines.last_mut() {
            Some(previous) if is_continuation => previous.push_str(&physical[1..]),
            _ => lines.push(physical.to_string()),
        }
    }

    lines
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folded_lines() {
        let raw = "BEGIN:VEVENT\r\nSUMMARY:A very long\r\n  summary\r\n\tthat goes on\r\nEND:VEVENT\r\n";
        let lines = unfold(raw);
        assert_eq!(lines, vec![
            "BEGIN:VEVENT",
            "SUMMARY:A very long summarythat goes on",
            "END:VEVENT",
        ]);
    }

    #[test]
    fn test_mixed_line_endings() {
        let lines = unfold("A:1\nB:2\r\nC:3");
        assert_eq!(lines, vec!["A:1", "B:2", "C:3"]);
    }

    #[test]
    fn test_leading_continuation_is_kept() {
        let lines = unfold(" orphan\nNAME:value\n more");
        assert_eq!(lines, vec![" orphan", "NAME:valuemore"]);
    }

    #[test]
    fn test_unfolding_is_idempotent() {
        let raw = "BEGIN:VEVENT\r\nSUMMARY:Lunch with\r\n  Mom\r\nDTSTART;VALUE=DATE:2025\r\n 0101\r\nEND:VEVENT\r\n";
        let once = unfold(raw);
        let twice = unfold(&once.join("\r\n"));
        assert_eq!(once, twice);
    }
}

/// Builds the `^` marker aligned under two compared lines.
///
/// The marker is as long as the longer line. A position is marked when the
/// bytes differ or when it lies past the end of the shorter line.
pub fn diff_marker(s1: &[u8], s2: &[u8]) -> String {
    let common = s1.len().min(s2.len());
    let longest = s1.len().max(s2.len());

    let mut marker = String::with_capacity(longest);
    marker.extend(
        s1.iter()
            .zip(s2)
            .map(|(a, b)| if a != b { '^' } else { ' ' }),
    );
    marker.extend(std::iter::repeat('^').take(longest - common));
    marker
}

/// Marker for a line that has no counterpart at all.
pub fn full_marker(len: usize) -> String {
    "^".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lines_have_blank_marker() {
        assert_eq!(diff_marker(b"abc", b"abc"), "   ");
    }

    #[test]
    fn test_marks_differing_bytes() {
        assert_eq!(diff_marker(b"abcd", b"abXd"), "  ^ ");
        assert_eq!(diff_marker(b"x", b"y"), "^");
    }

    #[test]
    fn test_extra_length_is_marked() {
        assert_eq!(diff_marker(b"ab", b"abcd"), "  ^^");
        assert_eq!(diff_marker(b"abcd", b"aX"), " ^^^");
        assert_eq!(diff_marker(b"", b"abc"), "^^^");
    }

    #[test]
    fn test_length_is_longest_input() {
        let cases: [(&[u8], &[u8]); 4] = [
            (b"", b""),
            (b"short", b"a much longer line"),
            (b"same", b"same"),
            (b"tab\there", b"tab here!"),
        ];
        for (a, b) in cases {
            let marker = diff_marker(a, b);
            assert_eq!(marker.len(), a.len().max(b.len()));
            let common = a.len().min(b.len());
            assert!(marker[common..].chars().all(|c| c == '^'));
        }
    }

    #[test]
    fn test_full_marker() {
        assert_eq!(full_marker(3), "^^^");
        assert_eq!(full_marker(0), "");
    }
}

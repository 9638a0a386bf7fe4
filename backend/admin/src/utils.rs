use std::ops::RangeInclusive;

use indicatif::{ProgressBar, ProgressStyle};

pub const BATCH_SIZE: u64 = 500;

pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);

    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }

    pb
}

/// Splits `1..=count` into consecutive ranges of at most `size` numbers.
pub fn batches(count: u64, size: u64) -> impl Iterator<Item = RangeInclusive<u64>> {
    let size = size.max(1);

    (0..count.div_ceil(size)).map(move |i| {
        let start = i * size + 1;
        start..=(start + size - 1).min(count)
    })
}

/// `[3, 4, 5, 9]` → `"3-5, 9"`. Input must be ascending.
pub fn format_ranges(numbers: &[u64]) -> String {
    let mut ranges: Vec<(u64, u64)> = Vec::new();

    for &n in numbers {
        match ranges.last_mut() {
            Some((_, end)) if *end + 1 == n => *end = n,
            _ => ranges.push((n, n)),
        }
    }

    ranges
        .into_iter()
        .map(|(start, end)| {
            if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{batches, format_ranges};

    #[test]
    fn test_batches_cover_range() {
        let all: Vec<_> = batches(1203, 500).collect();

        assert_eq!(all, vec![1..=500, 501..=1000, 1001..=1203]);
    }

    #[test]
    fn test_batches_exact_and_empty() {
        assert_eq!(batches(1000, 500).count(), 2);
        assert_eq!(batches(0, 500).count(), 0);
        assert_eq!(batches(1, 500).collect::<Vec<_>>(), vec![1..=1]);
    }

    #[test]
    fn test_format_ranges() {
        assert_eq!(format_ranges(&[3, 4, 5, 9]), "3-5, 9");
        assert_eq!(format_ranges(&[1]), "1");
        assert_eq!(format_ranges(&[]), "");
        assert_eq!(format_ranges(&[2, 4, 5]), "2, 4-5");
    }
}

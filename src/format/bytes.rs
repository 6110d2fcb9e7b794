use super::color::cyan;

const UNIT: u64 = 1024;

/// Prefix letters for successive powers of 1024, starting at KiB
const PREFIXES: &[u8] = b"KMGTPE";

/// Render a byte count with binary units, e.g. `512 B` or `1.5 KiB`
pub fn format_bytes(bytes: u64) -> String {
    if bytes < UNIT {
        return format!("{} {}", bytes, cyan("B"));
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let unit = format!("{}iB", PREFIXES[exp] as char);
    format!("{:.1} {}", bytes as f64 / div as f64, cyan(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::color::strip_ansi;

    fn plain(bytes: u64) -> String {
        strip_ansi(&format_bytes(bytes))
    }

    #[test]
    fn test_below_one_kib() {
        assert_eq!(plain(0), "0 B");
        assert_eq!(plain(512), "512 B");
        assert_eq!(plain(1023), "1023 B");
    }

    #[test]
    fn test_scaled_units() {
        assert_eq!(plain(1024), "1.0 KiB");
        assert_eq!(plain(1536), "1.5 KiB");
        assert_eq!(plain(2048), "2.0 KiB");
        assert_eq!(plain(1048576), "1.0 MiB");
        assert_eq!(plain(1u64 << 30), "1.0 GiB");
        assert_eq!(plain(1u64 << 40), "1.0 TiB");
        assert_eq!(plain(1u64 << 50), "1.0 PiB");
        assert_eq!(plain(1u64 << 60), "1.0 EiB");
        assert_eq!(plain(u64::MAX), "16.0 EiB");
    }

    #[test]
    fn test_unit_is_colored() {
        assert_eq!(format_bytes(1024), "1.0 \x1b[0;36mKiB\x1b[0m");
    }

    #[test]
    fn test_monotonic_within_unit() {
        let values: Vec<f64> = (1024..1024 * 1024)
            .step_by(997)
            .map(|b| {
                plain(b)
                    .split(' ')
                    .next()
                    .unwrap()
                    .parse::<f64>()
                    .unwrap()
            })
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }
}

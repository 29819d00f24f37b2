use std::time::Duration;

/// Parses a duration string into a [`Duration`].
///
/// Accepts either a bare number of seconds (`"3600"`) or a compound string in the format
/// `1d1h1m1s`, where each number is followed by one of `s`, `m`, `h` or `d` for seconds,
/// minutes, hours and days respectively.
///
/// # Returns
///
/// The parsed duration, or `None` if the input is empty, malformed or overflows.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use yumrepo_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("3600"), Some(Duration::from_secs(3600)));
/// assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return input.parse().ok().map(Duration::from_secs);
    }

    let mut total: u64 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut number_str = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                number_str.push(c);
                chars.next();
            } else {
                break;
            }
        }

        if number_str.is_empty() {
            return None;
        }

        let number: u64 = number_str.parse().ok()?;
        let multiplier = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(Duration::from_secs(total))
}
